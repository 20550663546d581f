use crate::turtle::{Outcome, Turtle};
use rand::prelude::*;

#[derive(Debug, Clone)]
enum Node {
    Move(u32),
    Turn(Turn),
    Pen(bool),
    Wait,
    Loop(u32, Vec<Node>),
}

#[derive(Debug, Clone, Copy)]
enum Turn {
    Left,
    Right,
    Backward,
    Degrees(i64),
}

impl Turn {
    fn cell(self) -> String {
        match self {
            Turn::Left => String::from("TURN|LEFT"),
            Turn::Right => String::from("TURN|RIGHT"),
            Turn::Backward => String::from("TURN|BACKWARD"),
            Turn::Degrees(degrees) => format!("TURN|{}", degrees),
        }
    }

    fn degrees(self) -> i64 {
        match self {
            Turn::Left => -90,
            Turn::Right => 90,
            Turn::Backward => 180,
            Turn::Degrees(degrees) => degrees,
        }
    }
}

const MAX_DEPTH: usize = 2;
const MAX_BODY: usize = 4;

fn random_node<R: Rng>(rng: &mut R, depth: usize) -> Node {
    let kinds = if depth < MAX_DEPTH { 6 } else { 5 };
    match rng.gen_range(0..kinds) {
        0 | 1 => Node::Move(rng.gen_range(1..=5)),
        2 => Node::Turn(match rng.gen_range(0..4) {
            0 => Turn::Left,
            1 => Turn::Right,
            2 => Turn::Backward,
            _ => Turn::Degrees(*[-270, -180, -90, 90, 180, 270].choose(rng).unwrap_or(&90)),
        }),
        3 => Node::Pen(rng.gen()),
        4 => Node::Wait,
        _ => Node::Loop(rng.gen_range(0..=3), random_body(rng, depth + 1)),
    }
}

fn random_body<R: Rng>(rng: &mut R, depth: usize) -> Vec<Node> {
    let len = rng.gen_range(1..=MAX_BODY);
    std::iter::repeat_with(|| random_node(rng, depth)).take(len).collect()
}

fn render(nodes: &[Node], indent: usize, rows: &mut Vec<Vec<String>>) {
    for node in nodes {
        let mut row = vec![String::new(); indent];
        let cell = match node {
            Node::Move(units) => format!("MOVE|{}", units),
            Node::Turn(turn) => turn.cell(),
            Node::Pen(true) => String::from("PEN_DOWN"),
            Node::Pen(false) => String::from("PEN_UP"),
            Node::Wait => String::from("WAIT|0"),
            Node::Loop(count, _) => format!("LOOP|{}", count),
        };
        row.push(cell);
        rows.push(row);

        if let Node::Loop(_, body) = node {
            render(body, indent + 1, rows);
        }
    }
}

fn exec(nodes: &[Node], turtle: &mut Turtle) {
    for node in nodes {
        match node {
            Node::Move(units) => turtle.forward(*units as f64),
            Node::Turn(turn) => turtle.turn(turn.degrees()),
            Node::Pen(down) => turtle.pen(*down),
            Node::Wait => turtle.step(),
            Node::Loop(count, body) => {
                for _ in 0..*count {
                    exec(body, turtle);
                }
            },
        }
    }
}

/// A random sensor-free program together with its expected outcome.
#[derive(Debug, Clone)]
pub struct GeneratedGrid {
    pub rows: Vec<Vec<String>>,
    pub expected: Outcome,
}

pub fn generate(seed: u64) -> GeneratedGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let program = random_body(&mut rng, 0);

    let mut rows = vec![];
    render(&program, 0, &mut rows);

    let mut turtle = Turtle::new();
    exec(&program, &mut turtle);

    GeneratedGrid {
        rows,
        expected: turtle.outcome(),
    }
}
