use crate::ast::*;

pub trait Visitable {
    fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Err>;
}

impl Visitable for Program {
    fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Err> {
        visitor.visit_program(self)
    }
}

impl Visitable for Command {
    fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Err> {
        visitor.visit_command(self)
    }
}

impl Visitable for Value {
    fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Err> {
        visitor.visit_value(self)
    }
}

pub trait Visitor: Sized {
    type Err;

    fn visit<V: Visitable>(&mut self, visitable: &V) -> Result<(), Self::Err> {
        visitable.accept(self)
    }

    fn visit_program(&mut self, program: &Program) -> Result<(), Self::Err> {
        self.visit_commands(&program.commands)
    }

    fn visit_commands(&mut self, commands: &Commands) -> Result<(), Self::Err> {
        for command in commands {
            self.visit(command)?;
        }

        Ok(())
    }

    fn visit_move_command(&mut self, _location: Location, distance: Option<&Value>) -> Result<(), Self::Err> {
        match distance {
            Some(distance) => self.visit(distance),
            None => Ok(()),
        }
    }

    fn visit_turn_command(&mut self, _location: Location, _direction: Option<Direction>, degrees: Option<&Value>) -> Result<(), Self::Err> {
        match degrees {
            Some(degrees) => self.visit(degrees),
            None => Ok(()),
        }
    }

    fn visit_loop_command(&mut self, _location: Location, count: &Value, body: &Commands) -> Result<(), Self::Err> {
        self.visit(count)?;
        self.visit_commands(body)
    }

    fn visit_while_command(&mut self, _location: Location, condition: &Value, body: &Commands) -> Result<(), Self::Err> {
        self.visit(condition)?;
        self.visit_commands(body)
    }

    fn visit_if_command(&mut self, _location: Location, condition: &Value, positive: &Commands, negative: Option<&Commands>) -> Result<(), Self::Err> {
        self.visit(condition)?;
        self.visit_commands(positive)?;
        match negative {
            Some(negative) => self.visit_commands(negative),
            None => Ok(()),
        }
    }

    fn visit_set_command(&mut self, _location: Location, _name: &str, value: &Value) -> Result<(), Self::Err> {
        self.visit(value)
    }

    fn visit_wait_command(&mut self, _location: Location, seconds: &Value) -> Result<(), Self::Err> {
        self.visit(seconds)
    }

    fn visit_toggle_command(&mut self, _location: Location, _kind: &CommandKind) -> Result<(), Self::Err> {
        Ok(())
    }

    fn visit_command(&mut self, command: &Command) -> Result<(), Self::Err> {
        walk_command(self, command)
    }

    fn visit_binary_value(&mut self, _op: Operator, left: &Value, right: &Value) -> Result<(), Self::Err> {
        self.visit(left)?;
        self.visit(right)
    }

    fn visit_variable_value(&mut self, _name: &str) -> Result<(), Self::Err> {
        Ok(())
    }

    fn visit_sensor_value(&mut self, _sensor: Sensor) -> Result<(), Self::Err> {
        Ok(())
    }

    fn visit_value(&mut self, value: &Value) -> Result<(), Self::Err> {
        match value {
            Value::Number(_) | Value::Boolean(_) | Value::Direction(_) => Ok(()),
            Value::Variable(name) => self.visit_variable_value(name),
            Value::Sensor(sensor) => self.visit_sensor_value(*sensor),
            Value::Binary { op, left, right } => self.visit_binary_value(*op, left, right),
            Value::Not(value) => self.visit(value.as_ref()),
        }
    }
}

/// Dispatches `command` to the matching `visit_*_command` method; lets
/// visitors that override [`Visitor::visit_command`] keep the default walk.
pub fn walk_command<V: Visitor>(visitor: &mut V, command: &Command) -> Result<(), V::Err> {
    let location = command.location;
    match &command.kind {
        CommandKind::Move { distance } => visitor.visit_move_command(location, distance.as_ref()),
        CommandKind::Turn { direction, degrees } => visitor.visit_turn_command(location, *direction, degrees.as_ref()),
        CommandKind::Loop { count, body } => visitor.visit_loop_command(location, count, body),
        CommandKind::While { condition, body } => visitor.visit_while_command(location, condition, body),
        CommandKind::If {
            condition,
            positive,
            negative,
        } => visitor.visit_if_command(location, condition, positive, negative.as_ref()),
        CommandKind::Set { name, value } => visitor.visit_set_command(location, name, value),
        CommandKind::Wait { seconds } => visitor.visit_wait_command(location, seconds),
        kind @ CommandKind::PenDown
        | kind @ CommandKind::PenUp
        | kind @ CommandKind::AlertOn
        | kind @ CommandKind::AlertOff => visitor.visit_toggle_command(location, kind),
    }
}
