use parser::ast::visitor::{walk_command, Visitable, Visitor};
use parser::ast::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::convert::Infallible;
use std::fmt::{self, Display, Formatter};

/// Something suspicious about a program that still parses and may run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Warning {
    PossiblyUndefinedVariable { name: String, location: Location },
    EmptyUnboundedLoop { location: Location },
    NegativeWait { seconds: f64, location: Location },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PossiblyUndefinedVariable { name, location } => {
                write!(f, "variable `{}` read at {} is never set", name, location)
            },
            Warning::EmptyUnboundedLoop { location } => {
                write!(f, "loop at {} has an empty body and may never finish", location)
            },
            Warning::NegativeWait { seconds, location } => {
                write!(f, "WAIT of {} seconds at {} is treated as 0", seconds, location)
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Leaf commands written in the program, not executions.
    pub leaf_commands: usize,
    /// When false, replaying the program always gives the same result.
    pub reads_sensors: bool,
    /// Deepest block nesting; 0 for a flat program.
    pub max_depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Verification {
    pub warnings: Vec<Warning>,
    pub summary: Summary,
}

pub fn verify(program: &Program) -> Verification {
    let mut assignments = AssignmentCollector::default();
    walk(program, &mut assignments);

    let mut verifier = ProgramVerifier::new(assignments.names);
    walk(program, &mut verifier);

    Verification {
        warnings: verifier.warnings,
        summary: verifier.summary,
    }
}

fn walk<V: Visitor<Err = Infallible>>(program: &Program, visitor: &mut V) {
    if let Err(never) = program.accept(visitor) {
        match never {}
    }
}

#[derive(Debug, Default)]
struct AssignmentCollector {
    names: BTreeSet<String>,
}

impl Visitor for AssignmentCollector {
    type Err = Infallible;

    fn visit_set_command(&mut self, _location: Location, name: &str, value: &Value) -> Result<(), Self::Err> {
        self.names.insert(name.to_owned());
        self.visit(value)
    }
}

#[derive(Debug)]
struct ProgramVerifier {
    assigned: BTreeSet<String>,
    reported: HashSet<String>,
    location: Location,
    depth: usize,
    warnings: Vec<Warning>,
    summary: Summary,
}

impl ProgramVerifier {
    fn new(assigned: BTreeSet<String>) -> ProgramVerifier {
        ProgramVerifier {
            assigned,
            reported: HashSet::new(),
            location: Location::new(0, 0),
            depth: 0,
            warnings: vec![],
            summary: Summary::default(),
        }
    }

    fn visit_block(&mut self, body: &Commands) -> Result<(), Infallible> {
        self.depth += 1;
        self.summary.max_depth = self.summary.max_depth.max(self.depth);
        let result = self.visit_commands(body);
        self.depth -= 1;
        result
    }
}

impl Visitor for ProgramVerifier {
    type Err = Infallible;

    fn visit_command(&mut self, command: &Command) -> Result<(), Self::Err> {
        self.location = command.location;
        if !command.is_block() {
            self.summary.leaf_commands += 1;
        }
        walk_command(self, command)
    }

    fn visit_loop_command(&mut self, location: Location, count: &Value, body: &Commands) -> Result<(), Self::Err> {
        self.visit(count)?;
        if body.is_empty() && *count == Value::Boolean(true) {
            self.warnings.push(Warning::EmptyUnboundedLoop { location });
        }
        self.visit_block(body)
    }

    fn visit_while_command(&mut self, location: Location, condition: &Value, body: &Commands) -> Result<(), Self::Err> {
        self.visit(condition)?;
        if body.is_empty() {
            self.warnings.push(Warning::EmptyUnboundedLoop { location });
        }
        self.visit_block(body)
    }

    fn visit_if_command(&mut self, _location: Location, condition: &Value, positive: &Commands, negative: Option<&Commands>) -> Result<(), Self::Err> {
        self.visit(condition)?;
        self.visit_block(positive)?;
        match negative {
            Some(negative) => self.visit_block(negative),
            None => Ok(()),
        }
    }

    fn visit_wait_command(&mut self, location: Location, seconds: &Value) -> Result<(), Self::Err> {
        if let Value::Number(seconds) = seconds {
            if *seconds < 0.0 {
                self.warnings.push(Warning::NegativeWait { seconds: *seconds, location });
            }
        }
        self.visit(seconds)
    }

    fn visit_variable_value(&mut self, name: &str) -> Result<(), Self::Err> {
        if !self.assigned.contains(name) && self.reported.insert(name.to_owned()) {
            self.warnings.push(Warning::PossiblyUndefinedVariable {
                name: name.to_owned(),
                location: self.location,
            });
        }
        Ok(())
    }

    fn visit_sensor_value(&mut self, _sensor: Sensor) -> Result<(), Self::Err> {
        self.summary.reads_sensors = true;
        Ok(())
    }
}
