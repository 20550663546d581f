use crate::context::ExecutionContext;
use crate::error::ErrorKind;
use parser::ast::{Operator, Sensor, Value};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::future::Future;
use std::pin::Pin;

pub(crate) type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Boolean(bool),
}

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Number(_) => "number",
            Scalar::Boolean(_) => "boolean",
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(num) => write!(f, "{}", num),
            Scalar::Boolean(true) => write!(f, "TRUE"),
            Scalar::Boolean(false) => write!(f, "FALSE"),
        }
    }
}

/// Live inputs polled while evaluating a value.
pub trait Sensors {
    /// Ultrasonic distance in centimetres.
    fn distance(&mut self) -> impl Future<Output = Result<f64, ErrorKind>>;
    /// Whether the line sensor sees black.
    fn line_detected(&mut self) -> impl Future<Output = Result<bool, ErrorKind>>;
    fn obstacle_threshold(&self) -> f64;
}

type EvalResult = Result<Scalar, ErrorKind>;

/// Resolves `value` to a scalar. Sensors are read every time they are
/// reached; operands are evaluated left before right, without short-circuit.
pub fn evaluate<'a, S>(value: &'a Value, context: &'a ExecutionContext, sensors: &'a mut S) -> LocalBoxFuture<'a, EvalResult>
where
    S: Sensors + 'a,
{
    Box::pin(async move {
        match value {
            Value::Number(num) => Ok(Scalar::Number(*num)),
            Value::Boolean(b) => Ok(Scalar::Boolean(*b)),
            Value::Direction(direction) => Ok(Scalar::Number(direction.degrees())),
            Value::Variable(name) => context.variable(name).ok_or_else(|| ErrorKind::UndefinedVariable(name.clone())),
            Value::Sensor(sensor) => read_sensor(*sensor, sensors).await,
            Value::Binary { op, left, right } => {
                let left = evaluate(left, context, &mut *sensors).await?;
                let right = evaluate(right, context, &mut *sensors).await?;
                apply(*op, left, right)
            },
            Value::Not(inner) => match evaluate(inner, context, sensors).await? {
                Scalar::Boolean(b) => Ok(Scalar::Boolean(!b)),
                other => Err(ErrorKind::TypeMismatch(format!("NOT needs a boolean, got {}", other.type_name()))),
            },
        }
    })
}

async fn read_sensor<S: Sensors>(sensor: Sensor, sensors: &mut S) -> EvalResult {
    let scalar = match sensor {
        Sensor::Distance => Scalar::Number(sensors.distance().await?),
        Sensor::Obstacle => {
            let distance = sensors.distance().await?;
            Scalar::Boolean(distance < sensors.obstacle_threshold())
        },
        Sensor::BlackDetected => Scalar::Boolean(sensors.line_detected().await?),
        Sensor::BlackLost => Scalar::Boolean(!sensors.line_detected().await?),
    };

    Ok(scalar)
}

pub fn apply(op: Operator, left: Scalar, right: Scalar) -> EvalResult {
    use Scalar::{Boolean, Number};

    let result = match (op, left, right) {
        (Operator::Div, Number(_), Number(b)) if b == 0.0 => return Err(ErrorKind::DivisionByZero),
        (Operator::Plus, Number(a), Number(b)) => Number(a + b),
        (Operator::Minus, Number(a), Number(b)) => Number(a - b),
        (Operator::Times, Number(a), Number(b)) => Number(a * b),
        (Operator::Div, Number(a), Number(b)) => Number(a / b),
        (Operator::Less, Number(a), Number(b)) => Boolean(a < b),
        (Operator::LessEq, Number(a), Number(b)) => Boolean(a <= b),
        (Operator::Greater, Number(a), Number(b)) => Boolean(a > b),
        (Operator::GreaterEq, Number(a), Number(b)) => Boolean(a >= b),
        (Operator::Eq, Number(a), Number(b)) => Boolean(a == b),
        (Operator::NotEq, Number(a), Number(b)) => Boolean(a != b),
        (Operator::Eq, Boolean(a), Boolean(b)) => Boolean(a == b),
        (Operator::NotEq, Boolean(a), Boolean(b)) => Boolean(a != b),
        (Operator::And, Boolean(a), Boolean(b)) => Boolean(a && b),
        (Operator::Or, Boolean(a), Boolean(b)) => Boolean(a || b),
        (op, left, right) => {
            return Err(ErrorKind::TypeMismatch(format!(
                "`{}` cannot combine {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name(),
            )));
        },
    };

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::ast::Direction;

    struct FakeSensors {
        distances: Vec<f64>,
        line: bool,
        reads: usize,
    }

    impl FakeSensors {
        fn new(distances: Vec<f64>, line: bool) -> FakeSensors {
            FakeSensors { distances, line, reads: 0 }
        }
    }

    impl Sensors for FakeSensors {
        async fn distance(&mut self) -> Result<f64, ErrorKind> {
            let value = self.distances.get(self.reads).copied()
                .ok_or_else(|| ErrorKind::HardwareUnavailable(String::from("no reading")))?;
            self.reads += 1;
            Ok(value)
        }

        async fn line_detected(&mut self) -> Result<bool, ErrorKind> {
            self.reads += 1;
            Ok(self.line)
        }

        fn obstacle_threshold(&self) -> f64 {
            30.0
        }
    }

    async fn eval(value: &Value, context: &ExecutionContext) -> EvalResult {
        evaluate(value, context, &mut FakeSensors::new(vec![50.0], true)).await
    }

    #[tokio::test]
    async fn literals() {
        let context = ExecutionContext::new();
        assert_eq!(eval(&Value::Number(1.5), &context).await, Ok(Scalar::Number(1.5)));
        assert_eq!(eval(&Value::Boolean(false), &context).await, Ok(Scalar::Boolean(false)));
        assert_eq!(eval(&Value::Direction(Direction::Left), &context).await, Ok(Scalar::Number(270.0)));
    }

    #[tokio::test]
    async fn variables() {
        let mut context = ExecutionContext::new();
        context.set_variable("x", Scalar::Number(5.0));
        let sum = Value::binary(Operator::Plus, Value::variable("x"), Value::Number(3.0));

        assert_eq!(eval(&sum, &context).await, Ok(Scalar::Number(8.0)));
        assert_eq!(
            eval(&Value::variable("y"), &context).await,
            Err(ErrorKind::UndefinedVariable(String::from("Y"))),
        );
    }

    #[tokio::test]
    async fn division_by_zero() {
        let context = ExecutionContext::new();
        let value = Value::binary(Operator::Div, Value::Number(10.0), Value::Number(0.0));

        assert_eq!(eval(&value, &context).await, Err(ErrorKind::DivisionByZero));
    }

    #[tokio::test]
    async fn type_mismatch() {
        let context = ExecutionContext::new();
        let mixed = Value::binary(Operator::Plus, Value::Number(1.0), Value::Boolean(true));
        let and_numbers = Value::binary(Operator::And, Value::Number(1.0), Value::Number(1.0));
        let not_number = Value::not(Value::Number(1.0));
        let eq_mixed = Value::binary(Operator::Eq, Value::Number(1.0), Value::Boolean(true));

        for value in &[mixed, and_numbers, not_number, eq_mixed] {
            assert!(matches!(eval(value, &context).await, Err(ErrorKind::TypeMismatch(_))), "{}", value);
        }
    }

    #[tokio::test]
    async fn equality_on_booleans() {
        let context = ExecutionContext::new();
        let value = Value::binary(Operator::NotEq, Value::Boolean(true), Value::Sensor(Sensor::BlackLost));

        assert_eq!(eval(&value, &context).await, Ok(Scalar::Boolean(true)));
    }

    #[tokio::test]
    async fn sensors_are_read_each_time() {
        let context = ExecutionContext::new();
        let mut sensors = FakeSensors::new(vec![50.0, 20.0], false);
        let value = Value::Sensor(Sensor::Obstacle);

        assert_eq!(evaluate(&value, &context, &mut sensors).await, Ok(Scalar::Boolean(false)));
        assert_eq!(evaluate(&value, &context, &mut sensors).await, Ok(Scalar::Boolean(true)));
        assert!(matches!(
            evaluate(&value, &context, &mut sensors).await,
            Err(ErrorKind::HardwareUnavailable(_)),
        ));
    }

    #[tokio::test]
    async fn no_short_circuit() {
        let context = ExecutionContext::new();
        let mut sensors = FakeSensors::new(vec![], true);
        let value = Value::binary(
            Operator::Or,
            Value::Sensor(Sensor::BlackDetected),
            Value::Sensor(Sensor::BlackLost),
        );

        assert_eq!(evaluate(&value, &context, &mut sensors).await, Ok(Scalar::Boolean(true)));
        assert_eq!(sensors.reads, 2);
    }

    #[test]
    fn left_to_right_arithmetic() {
        let step = apply(Operator::Plus, Scalar::Number(1.0), Scalar::Number(2.0)).unwrap();
        assert_eq!(apply(Operator::Times, step, Scalar::Number(3.0)), Ok(Scalar::Number(9.0)));
    }
}
