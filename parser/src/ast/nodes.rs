use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub commands: Commands,
}

pub type Commands = Vec<Command>;

/// Row and column of the grid cell a command starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Location {
        Location { row, col }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub location: Location,
}

impl Command {
    pub fn new(kind: CommandKind, location: Location) -> Command {
        Command { kind, location }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_block(&self) -> bool {
        self.kind.is_block()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Move { distance: Option<Value> },
    Turn { direction: Option<Direction>, degrees: Option<Value> },
    Loop { count: Value, body: Commands },
    While { condition: Value, body: Commands },
    If { condition: Value, positive: Commands, negative: Option<Commands> },
    Set { name: String, value: Value },
    PenDown,
    PenUp,
    Wait { seconds: Value },
    AlertOn,
    AlertOff,
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        use CommandKind::*;
        match self {
            Move { .. } => "MOVE",
            Turn { .. } => "TURN",
            Loop { .. } => "LOOP",
            While { .. } => "WHILE",
            If { .. } => "IF",
            Set { .. } => "SET",
            PenDown => "PEN_DOWN",
            PenUp => "PEN_UP",
            Wait { .. } => "WAIT",
            AlertOn => "ALERT_ON",
            AlertOff => "ALERT_OFF",
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, CommandKind::Loop { .. } | CommandKind::While { .. } | CommandKind::If { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    Distance,
    Obstacle,
    BlackDetected,
    BlackLost,
}

impl Sensor {
    pub fn keyword(self) -> &'static str {
        match self {
            Sensor::Distance => "DISTANCE",
            Sensor::Obstacle => "OBSTACLE",
            Sensor::BlackDetected => "BLACK_DETECTED",
            Sensor::BlackLost => "BLACK_LOST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Right,
    Backward,
    Left,
}

impl Direction {
    /// Clockwise angle from `Forward`.
    pub fn degrees(self) -> f64 {
        match self {
            Direction::Forward => 0.0,
            Direction::Right => 90.0,
            Direction::Backward => 180.0,
            Direction::Left => 270.0,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Forward => "FORWARD",
            Direction::Right => "RIGHT",
            Direction::Backward => "BACKWARD",
            Direction::Left => "LEFT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Div,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Eq,
    NotEq,
    And,
    Or,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        use Operator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Times => "*",
            Div => "/",
            Less => "<",
            LessEq => "<=",
            Greater => ">",
            GreaterEq => ">=",
            Eq => "=",
            NotEq => "!=",
            And => "AND",
            Or => "OR",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, Operator::Plus | Operator::Minus | Operator::Times | Operator::Div)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Variable(String),
    Sensor(Sensor),
    Direction(Direction),
    Binary { op: Operator, left: Box<Value>, right: Box<Value> },
    Not(Box<Value>),
}

impl Value {
    pub fn binary(op: Operator, left: Value, right: Value) -> Value {
        Value::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(value: Value) -> Value {
        Value::Not(Box::new(value))
    }

    pub fn variable(name: &str) -> Value {
        Value::Variable(name.to_uppercase())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(num) => write!(f, "{}", num),
            Value::Boolean(true) => write!(f, "TRUE"),
            Value::Boolean(false) => write!(f, "FALSE"),
            Value::Variable(name) => write!(f, "{}", name),
            Value::Sensor(sensor) => write!(f, "{}", sensor.keyword()),
            Value::Direction(direction) => write!(f, "{}", direction.keyword()),
            Value::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Value::Not(value) => write!(f, "NOT {}", value),
        }
    }
}
