use ::gridbot::verifier::{verify, Summary, Warning};
use ::parser::ast::*;
use ::parser::{parse_grid, Grid};
use pretty_assertions::assert_eq;

fn at(row: usize, col: usize) -> Location {
    Location::new(row, col)
}

fn parse(rows: &[&[&str]]) -> Program {
    parse_grid(&Grid::from_rows(rows.iter().map(|row| row.iter().copied()))).unwrap()
}

#[test]
fn empty_program_ok() {
    let result = verify(&Program { commands: vec![] });

    assert_eq!(result.warnings, vec![]);
    assert_eq!(result.summary, Summary::default());
}

#[test]
fn assigned_variable_ok() {
    let program = Program {
        commands: vec![
            Command::new(CommandKind::Set { name: String::from("N"), value: Value::Number(2.0) }, at(0, 0)),
            Command::new(CommandKind::Move { distance: Some(Value::variable("n")) }, at(1, 0)),
        ],
    };

    let result = verify(&program);

    assert_eq!(result.warnings, vec![]);
    assert_eq!(result.summary, Summary { leaf_commands: 2, reads_sensors: false, max_depth: 0 });
}

#[test]
fn undefined_variable_reported_once() {
    let program = parse(&[
        &["MOVE|X"],
        &["TURN|RIGHT|X + 1"],
    ]);

    let expected_warnings = vec![
        Warning::PossiblyUndefinedVariable { name: String::from("X"), location: at(0, 0) },
    ];

    assert_eq!(verify(&program).warnings, expected_warnings);
}

#[test]
fn assignment_later_in_program_counts() {
    let program = parse(&[
        &["LOOP|2"],
        &["", "IF|FLAG"],
        &["", "", "MOVE|1"],
        &["", "SET|FLAG|TRUE"],
    ]);

    assert_eq!(verify(&program).warnings, vec![]);
}

#[test]
fn empty_unbounded_loops() {
    let program = parse(&[
        &["LOOP|FOREVER"],
        &["WHILE|NOT|OBSTACLE"],
        &["LOOP|3"],
    ]);

    let expected_warnings = vec![
        Warning::EmptyUnboundedLoop { location: at(0, 0) },
        Warning::EmptyUnboundedLoop { location: at(1, 0) },
    ];

    assert_eq!(verify(&program).warnings, expected_warnings);
}

#[test]
fn negative_wait() {
    let program = parse(&[&["WAIT|-2"]]);

    let expected_warnings = vec![
        Warning::NegativeWait { seconds: -2.0, location: at(0, 0) },
    ];

    assert_eq!(verify(&program).warnings, expected_warnings);
}

#[test]
fn summary_counts_leaves_and_depth() {
    let program = parse(&[
        &["PEN_DOWN"],
        &["LOOP|4"],
        &["", "IF|DISTANCE|<|20"],
        &["", "", "TURN|LEFT"],
        &["", "ELSE"],
        &["", "", "MOVE|1"],
        &["PEN_UP"],
    ]);

    let summary = verify(&program).summary;

    assert_eq!(summary, Summary { leaf_commands: 4, reads_sensors: true, max_depth: 2 });
}

#[test]
fn warnings_serialize_with_kind() {
    let warning = Warning::EmptyUnboundedLoop { location: at(3, 1) };
    let json = serde_json::to_value(&warning).unwrap();

    assert_eq!(json, serde_json::json!({ "kind": "EmptyUnboundedLoop", "location": { "row": 3, "col": 1 } }));
}
