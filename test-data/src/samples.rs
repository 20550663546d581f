use crate::turtle::{Outcome, Turtle};

pub struct Data {
    text: &'static str,
    exec_fn: fn(&mut Turtle),
}

impl Data {
    /// Comma separated grid text.
    pub fn text(&self) -> &'static str {
        self.text
    }

    pub fn exec(&self) -> Outcome {
        let mut turtle = Turtle::new();
        (self.exec_fn)(&mut turtle);
        turtle.outcome()
    }
}

const SQUARE_TEXT: &str = "\
PEN_DOWN
LOOP|4
,MOVE|2
,TURN|RIGHT
PEN_UP
";

fn square(t: &mut Turtle) {
    t.pen(true);
    for _ in 0..4 {
        t.forward(2.0);
        t.turn(90);
    }
    t.pen(false);
}

pub const SQUARE_DATA: Data = Data {
    text: SQUARE_TEXT,
    exec_fn: square,
};

const SPIRAL_TEXT: &str = "\
SET|N|1
LOOP|5
,MOVE|N
,TURN|LEFT
,SET|N|N + 1
";

fn spiral(t: &mut Turtle) {
    t.step();
    for n in 1..=5 {
        t.forward(n as f64);
        t.turn(-90);
        t.step();
    }
}

pub const SPIRAL_DATA: Data = Data {
    text: SPIRAL_TEXT,
    exec_fn: spiral,
};

const COUNTDOWN_TEXT: &str = "\
SET|I|3
WHILE|I > 0
,MOVE|I
,SET|I|I - 1
TURN|BACKWARD
MOVE|6
";

fn countdown(t: &mut Turtle) {
    t.step();
    let mut i = 3;
    while i > 0 {
        t.forward(i as f64);
        t.step();
        i -= 1;
    }
    t.turn(180);
    t.forward(6.0);
}

pub const COUNTDOWN_DATA: Data = Data {
    text: COUNTDOWN_TEXT,
    exec_fn: countdown,
};

const BRANCHES_TEXT: &str = "\
SET|K|0
LOOP|4
,IF|K = 2
,,TURN|RIGHT
,ELSE
,,MOVE|1
,SET|K|K + 1
";

fn branches(t: &mut Turtle) {
    t.step();
    for k in 0..4 {
        if k == 2 {
            t.turn(90);
        } else {
            t.forward(1.0);
        }
        t.step();
    }
}

pub const BRANCHES_DATA: Data = Data {
    text: BRANCHES_TEXT,
    exec_fn: branches,
};

const FRACTIONS_TEXT: &str = "\
LOOP|2.9
,MOVE|1.5
TURN|-90
MOVE|0.25
";

fn fractions(t: &mut Turtle) {
    for _ in 0..2 {
        t.forward(1.5);
    }
    t.turn(-90);
    t.forward(0.25);
}

pub const FRACTIONS_DATA: Data = Data {
    text: FRACTIONS_TEXT,
    exec_fn: fractions,
};

const ALIASES_TEXT: &str = "\
# lower case and alternative spellings
pendown
repeat|3
,mov|1
,pause|0
penup
";

fn aliases(t: &mut Turtle) {
    t.pen(true);
    for _ in 0..3 {
        t.forward(1.0);
        t.step();
    }
    t.pen(false);
}

pub const ALIASES_DATA: Data = Data {
    text: ALIASES_TEXT,
    exec_fn: aliases,
};
