use crate::evaluate::Scalar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

pub const DEFAULT_STEP_LIMIT: u64 = 1000;

/// Fixed-point scale: positions are stored in thousandths of a grid unit.
pub const SCALE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Heading {
    Forward,
    Right,
    Backward,
    Left,
}

impl Default for Heading {
    fn default() -> Heading {
        Heading::Forward
    }
}

impl Heading {
    pub fn degrees(self) -> i64 {
        match self {
            Heading::Forward => 0,
            Heading::Right => 90,
            Heading::Backward => 180,
            Heading::Left => 270,
        }
    }

    /// Nearest cardinal direction; halfway angles round clockwise.
    pub fn from_degrees(degrees: f64) -> Heading {
        let quarter = (degrees.rem_euclid(360.0) / 90.0).round() as i64;
        match quarter.rem_euclid(4) {
            0 => Heading::Forward,
            1 => Heading::Right,
            2 => Heading::Backward,
            _ => Heading::Left,
        }
    }

    pub fn turned(self, degrees: f64) -> Heading {
        Heading::from_degrees(self.degrees() as f64 + degrees)
    }

    /// Unit step along this heading; FORWARD is +y, RIGHT is +x.
    fn axis(self) -> (i64, i64) {
        match self {
            Heading::Forward => (0, 1),
            Heading::Right => (1, 0),
            Heading::Backward => (0, -1),
            Heading::Left => (-1, 0),
        }
    }
}

impl Display for Heading {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Heading::Forward => "FORWARD",
            Heading::Right => "RIGHT",
            Heading::Backward => "BACKWARD",
            Heading::Left => "LEFT",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Units {
    x: f64,
    y: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Units", from = "Units")]
pub struct Position {
    x: i64,
    y: i64,
}

fn to_fixed(units: f64) -> i64 {
    (units * SCALE as f64).round() as i64
}

impl Position {
    pub fn new(x: f64, y: f64) -> Position {
        Position {
            x: to_fixed(x),
            y: to_fixed(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x as f64 / SCALE as f64
    }

    pub fn y(&self) -> f64 {
        self.y as f64 / SCALE as f64
    }

    pub fn moved(self, heading: Heading, units: f64) -> Position {
        let distance = to_fixed(units);
        let (dx, dy) = heading.axis();
        Position {
            x: self.x.saturating_add(dx.saturating_mul(distance)),
            y: self.y.saturating_add(dy.saturating_mul(distance)),
        }
    }
}

impl From<Units> for Position {
    fn from(units: Units) -> Position {
        Position::new(units.x, units.y)
    }
}

impl From<Position> for Units {
    fn from(position: Position) -> Units {
        Units {
            x: position.x(),
            y: position.y(),
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x(), self.y())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub from: Position,
    pub to: Position,
}

/// The single mutable record a run works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionContext {
    pub position: Position,
    pub heading: Heading,
    pub variables: BTreeMap<String, Scalar>,
    pub pen_down: bool,
    pub path: Vec<Segment>,
    pub step_count: u64,
    pub step_limit: u64,
}

impl Default for ExecutionContext {
    fn default() -> ExecutionContext {
        ExecutionContext::with_step_limit(DEFAULT_STEP_LIMIT)
    }
}

impl ExecutionContext {
    pub fn new() -> ExecutionContext {
        ExecutionContext::default()
    }

    pub fn with_step_limit(step_limit: u64) -> ExecutionContext {
        ExecutionContext {
            position: Position::default(),
            heading: Heading::default(),
            variables: BTreeMap::new(),
            pen_down: false,
            path: vec![],
            step_count: 0,
            step_limit,
        }
    }

    pub fn variable(&self, name: &str) -> Option<Scalar> {
        self.variables.get(&name.to_uppercase()).copied()
    }

    pub fn set_variable(&mut self, name: &str, value: Scalar) {
        self.variables.insert(name.to_uppercase(), value);
    }

    /// Moves along the current heading, recording a segment while the pen is down.
    pub fn advance(&mut self, units: f64) {
        let from = self.position;
        let to = from.moved(self.heading, units);
        self.position = to;

        if self.pen_down {
            self.path.push(Segment { from, to });
        }
    }

    pub fn turn(&mut self, degrees: f64) {
        self.heading = self.heading.turned(degrees);
    }

    pub fn limit_reached(&self) -> bool {
        self.step_count >= self.step_limit
    }
}
