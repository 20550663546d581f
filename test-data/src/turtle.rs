/// Where a sensor-free program must leave the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub x: f64,
    pub y: f64,
    /// 0, 90, 180 or 270, clockwise from the starting heading.
    pub heading: i64,
    pub steps: u64,
    pub pen_down: bool,
}

/// Plain reference model of the robot, driven directly from Rust.
#[derive(Debug, Clone, Default)]
pub struct Turtle {
    x: f64,
    y: f64,
    heading: i64,
    steps: u64,
    pen_down: bool,
}

impl Turtle {
    pub fn new() -> Turtle {
        Turtle::default()
    }

    pub fn forward(&mut self, units: f64) {
        match self.heading {
            0 => self.y += units,
            90 => self.x += units,
            180 => self.y -= units,
            _ => self.x -= units,
        }
        self.steps += 1;
    }

    /// `degrees` must be a multiple of 90.
    pub fn turn(&mut self, degrees: i64) {
        self.heading = (self.heading + degrees).rem_euclid(360);
        self.steps += 1;
    }

    pub fn pen(&mut self, down: bool) {
        self.pen_down = down;
        self.steps += 1;
    }

    /// Any other leaf command.
    pub fn step(&mut self) {
        self.steps += 1;
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            x: self.x,
            y: self.y,
            heading: self.heading,
            steps: self.steps,
            pen_down: self.pen_down,
        }
    }
}
