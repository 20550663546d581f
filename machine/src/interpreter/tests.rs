use crate::context::{Heading, Position, Segment};
use crate::error::ErrorKind;
use crate::evaluate::Scalar;
use crate::interpreter::hardware::{Action, SimulatedHardware};
use crate::interpreter::progress::{CollectedProgress, Severity};
use crate::interpreter::run::{run, run_simulated, run_with_progress};
use crate::interpreter::{ExecutionResult, Options, Status};
use parser::ast::{Location, Program};
use parser::{parse_grid, Grid};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn program(rows: &[&[&str]]) -> Program {
    let grid = Grid::from_rows(rows.iter().map(|row| row.iter().copied()));
    parse_grid(&grid).expect("test program must parse")
}

async fn simulate(rows: &[&[&str]]) -> ExecutionResult {
    run_simulated(&program(rows), Options::default()).await.0
}

fn with_step_limit(step_limit: u64) -> Options {
    Options { step_limit, ..Options::default() }
}

#[tokio::test]
async fn empty_program() {
    let result = simulate(&[]).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.step_count, 0);
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn counted_loop() {
    let result = simulate(&[
        &["LOOP|5"],
        &["", "MOVE|1"],
    ]).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.position, Position::new(0.0, 5.0));
    assert_eq!(result.context.heading, Heading::Forward);
    assert_eq!(result.context.step_count, 5);
}

#[tokio::test]
async fn if_false_runs_else_branch_only() {
    let result = simulate(&[
        &["IF|FALSE"],
        &["", "MOVE|1"],
        &["", "MOVE|1"],
        &["ELSE"],
        &["", "TURN"],
    ]).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.position, Position::new(0.0, 0.0));
    assert_eq!(result.context.heading, Heading::Right);
    assert_eq!(result.context.step_count, 1);
}

#[tokio::test]
async fn variables_persist() {
    let result = simulate(&[
        &["SET|X|5"],
        &["SET|Y|X|+|3"],
        &["MOVE|Y"],
        &["MOVE|y|-|x"],
    ]).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.variable("X"), Some(Scalar::Number(5.0)));
    assert_eq!(result.context.variable("Y"), Some(Scalar::Number(8.0)));
    assert_eq!(result.context.position, Position::new(0.0, 11.0));
}

#[tokio::test]
async fn unbounded_loop_stops_at_step_limit() {
    let result = simulate(&[
        &["LOOP|TRUE"],
        &["", "MOVE|1"],
    ]).await;

    assert_eq!(result.status, Status::Failed);
    assert_eq!(result.context.step_count, 1000);
    assert_eq!(result.context.position, Position::new(0.0, 1000.0));

    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::StepLimitExceeded(1000));
    assert_eq!(error.location, Location::new(1, 1));
}

#[tokio::test]
async fn step_limit_is_exact() {
    let rows: &[&[&str]] = &[&["TURN"], &["TURN"], &["TURN"]];

    let (completed, _) = run_simulated(&program(rows), with_step_limit(3)).await;
    assert_eq!(completed.status, Status::Completed);
    assert_eq!(completed.context.step_count, 3);

    let (failed, hardware) = run_simulated(&program(rows), with_step_limit(2)).await;
    assert_eq!(failed.status, Status::Failed);
    assert_eq!(failed.context.step_count, 2);
    assert_eq!(failed.error.unwrap().location, Location::new(2, 0));
    assert_eq!(hardware.turns(), vec![90.0, 90.0]);
}

#[tokio::test]
async fn division_by_zero_keeps_context() {
    let result = simulate(&[
        &["SET|A|1"],
        &["MOVE|2"],
        &["SET|Z|10|/|0"],
        &["MOVE|1"],
    ]).await;

    assert_eq!(result.status, Status::Failed);
    let error = result.error.clone().unwrap();
    assert_eq!(error.kind, ErrorKind::DivisionByZero);
    assert_eq!(error.location, Location::new(2, 0));

    assert_eq!(result.context.step_count, 2);
    assert_eq!(result.context.position, Position::new(0.0, 2.0));
    assert_eq!(result.context.variable("A"), Some(Scalar::Number(1.0)));
    assert_eq!(result.context.variable("Z"), None);
}

#[tokio::test]
async fn undefined_variable() {
    let result = simulate(&[
        &["MOVE|1"],
        &["IF|READY"],
        &["", "MOVE|1"],
    ]).await;

    assert_eq!(result.status, Status::Failed);
    assert_eq!(result.error.unwrap(), crate::RuntimeError::new(
        ErrorKind::UndefinedVariable(String::from("READY")),
        Location::new(1, 0),
    ));
    assert_eq!(result.context.step_count, 1);
}

#[tokio::test]
async fn conditions_must_be_boolean() {
    let result = simulate(&[&["WHILE|5"], &["", "MOVE"]]).await;
    assert!(matches!(result.error.unwrap().kind, ErrorKind::TypeMismatch(_)));

    let result = simulate(&[&["MOVE|TRUE"]]).await;
    assert!(matches!(result.error.unwrap().kind, ErrorKind::TypeMismatch(_)));
}

#[tokio::test]
async fn cancel_mid_unbounded_loop() {
    let rows: &[&[&str]] = &[
        &["PEN_DOWN"],
        &["LOOP|TRUE"],
        &["", "MOVE|1"],
    ];
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let mut moves = 0;
    let mut progress = move |_severity: Severity, message: &str| {
        if message.starts_with("Executing MOVE") {
            moves += 1;
            if moves == 10 {
                trigger.cancel();
            }
        }
    };
    let mut hardware = SimulatedHardware::new();

    let result = run(&program(rows), &mut hardware, &mut progress, cancel, Options::default()).await;

    assert_eq!(result.status, Status::Cancelled);
    assert_eq!(result.error, None);
    assert_eq!(result.context.step_count, 11);
    assert!(result.context.step_count < result.context.step_limit);
    assert_eq!(result.context.position, Position::new(0.0, 10.0));
    assert_eq!(result.context.path.len(), 10);
    assert_eq!(hardware.moves().len(), 10);
}

#[tokio::test]
async fn cancelled_before_start() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut hardware = SimulatedHardware::new();
    let mut progress = CollectedProgress::new();

    let result = run(&program(&[&["MOVE|1"]]), &mut hardware, &mut progress, cancel, Options::default()).await;

    assert_eq!(result.status, Status::Cancelled);
    assert!(hardware.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_wait() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });
    let mut hardware = SimulatedHardware::new();
    let mut progress = CollectedProgress::new();
    let start = Instant::now();

    let result = run(
        &program(&[&["MOVE|1"], &["WAIT|60"], &["MOVE|1"]]),
        &mut hardware,
        &mut progress,
        cancel,
        Options::default(),
    ).await;

    assert_eq!(result.status, Status::Cancelled);
    assert_eq!(result.context.step_count, 1);
    assert!(start.elapsed() < Duration::from_secs(60));
    assert_eq!(hardware.moves(), vec![1.0]);
}

#[tokio::test(start_paused = true)]
async fn wait_suspends() {
    let start = Instant::now();
    let result = simulate(&[&["WAIT|2.5"]]).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.step_count, 1);
    assert!(start.elapsed() >= Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn negative_wait_is_zero() {
    let mut hardware = SimulatedHardware::new();
    let start = Instant::now();
    let (result, messages) = run_with_progress(&program(&[&["WAIT|-3"]]), &mut hardware, Options::default()).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.step_count, 1);
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(messages.iter().any(|(severity, _)| *severity == Severity::Warning));
}

#[tokio::test]
async fn bare_move_uses_sentinel() {
    let (result, hardware) = run_simulated(&program(&[&["MOVE"]]), Options::default()).await;

    assert_eq!(result.context.position, Position::new(0.0, 999.0));
    assert_eq!(hardware.moves(), vec![999.0]);
}

#[tokio::test]
async fn turn_forms() {
    let (result, hardware) = run_simulated(&program(&[
        &["TURN"],
        &["TURN|LEFT"],
        &["TURN|-90"],
        &["TURN|RIGHT|-180"],
        &["TURN|BACKWARD"],
    ]), Options::default()).await;

    assert_eq!(hardware.turns(), vec![90.0, -90.0, -90.0, 180.0, 180.0]);
    assert_eq!(result.context.heading, Heading::Left);
    assert_eq!(result.context.step_count, 5);
}

#[tokio::test]
async fn pen_path() {
    let result = simulate(&[
        &["MOVE|1"],
        &["PEN_DOWN"],
        &["MOVE|2"],
        &["TURN|LEFT"],
        &["MOVE|-1"],
        &["PEN_UP"],
        &["MOVE|5"],
    ]).await;

    assert_eq!(result.context.path, vec![
        Segment { from: Position::new(0.0, 1.0), to: Position::new(0.0, 3.0) },
        Segment { from: Position::new(0.0, 3.0), to: Position::new(1.0, 3.0) },
    ]);
    assert!(!result.context.pen_down);
    assert_eq!(result.context.position, Position::new(-4.0, 3.0));
    assert_eq!(result.context.step_count, 7);
}

#[tokio::test]
async fn while_counter() {
    let result = simulate(&[
        &["SET|N|0"],
        &["WHILE|N|<|3"],
        &["", "SET|N|N|+|1"],
        &["", "MOVE|1"],
    ]).await;

    assert_eq!(result.context.variable("N"), Some(Scalar::Number(3.0)));
    assert_eq!(result.context.position, Position::new(0.0, 3.0));
    assert_eq!(result.context.step_count, 7);
}

#[tokio::test]
async fn loop_count_is_evaluated_once() {
    let result = simulate(&[
        &["SET|N|3"],
        &["LOOP|N"],
        &["", "SET|N|N|+|1"],
    ]).await;

    assert_eq!(result.context.variable("N"), Some(Scalar::Number(6.0)));
    assert_eq!(result.context.step_count, 4);
}

#[tokio::test]
async fn loop_counts() {
    let result = simulate(&[
        &["LOOP|2.9"],
        &["", "MOVE|1"],
        &["LOOP|-1"],
        &["", "MOVE|1"],
        &["LOOP|FALSE"],
        &["", "MOVE|1"],
    ]).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.step_count, 2);
}

#[tokio::test]
async fn drive_until_obstacle() {
    let mut hardware = SimulatedHardware::new().with_distances(vec![100.0, 80.0, 20.0]);
    let rows: &[&[&str]] = &[
        &["WHILE|NOT|OBSTACLE"],
        &["", "MOVE|1"],
        &["IF|DISTANCE|<|30"],
        &["", "ALERT_ON"],
    ];

    let (result, _) = run_with_progress(&program(rows), &mut hardware, Options::default()).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(result.context.position, Position::new(0.0, 2.0));
    assert_eq!(hardware.history(), &[
        Action::ReadDistance(100.0),
        Action::Move(1.0),
        Action::ReadDistance(80.0),
        Action::Move(1.0),
        Action::ReadDistance(20.0),
        Action::ReadDistance(100.0),
    ]);
}

#[tokio::test]
async fn line_sensor() {
    let mut hardware = SimulatedHardware::new().with_line_sensor(true);
    let rows: &[&[&str]] = &[
        &["IF|BLACK_LOST"],
        &["", "ALERT_OFF"],
        &["ELSE"],
        &["", "ALERT_ON"],
    ];

    let (result, _) = run_with_progress(&program(rows), &mut hardware, Options::default()).await;

    assert_eq!(result.status, Status::Completed);
    assert_eq!(hardware.history(), &[Action::ReadLine(true), Action::Alert(true)]);
}

#[tokio::test]
async fn hardware_failure() {
    let mut hardware = SimulatedHardware::new().failing_after(1);
    let (result, _) = run_with_progress(&program(&[&["MOVE|1"], &["MOVE|1"]]), &mut hardware, Options::default()).await;

    assert_eq!(result.status, Status::Failed);
    let error = result.error.unwrap();
    assert!(matches!(error.kind, ErrorKind::HardwareUnavailable(_)));
    assert_eq!(error.location, Location::new(1, 0));
    assert_eq!(result.context.position, Position::new(0.0, 1.0));
    assert_eq!(result.context.step_count, 1);
}

#[tokio::test]
async fn sensor_failure() {
    let mut hardware = SimulatedHardware::new().failing_after(0);
    let (result, _) = run_with_progress(&program(&[&["SET|D|DISTANCE"]]), &mut hardware, Options::default()).await;

    assert!(matches!(result.error.unwrap().kind, ErrorKind::HardwareUnavailable(_)));
    assert_eq!(result.context.variable("D"), None);
}

#[tokio::test(start_paused = true)]
async fn slow_hardware_times_out() {
    let mut hardware = SimulatedHardware::new().with_latency(Duration::from_secs(20));
    let options = Options {
        hardware_timeout: Duration::from_secs(15),
        ..Options::default()
    };

    let (result, _) = run_with_progress(&program(&[&["PEN_DOWN"]]), &mut hardware, options).await;

    assert_eq!(result.status, Status::Failed);
    assert!(matches!(result.error.unwrap().kind, ErrorKind::HardwareUnavailable(_)));
    assert!(!result.context.pen_down);
    assert_eq!(result.context.step_count, 0);
}

#[tokio::test]
async fn progress_messages() {
    let mut hardware = SimulatedHardware::new();
    let rows: &[&[&str]] = &[
        &["LOOP|2"],
        &["", "MOVE|1"],
    ];

    let (_, messages) = run_with_progress(&program(rows), &mut hardware, Options::default()).await;
    let info: Vec<_> = messages.iter()
        .filter(|(severity, _)| *severity == Severity::Info)
        .map(|(_, message)| message.as_str())
        .collect();

    assert_eq!(info, vec![
        "Executing LOOP at (0, 0)",
        "Executing MOVE at (1, 1)",
        "Executing MOVE at (1, 1)",
    ]);
    assert_eq!(messages.last().map(|(severity, _)| *severity), Some(Severity::Success));
}

#[tokio::test]
async fn replay_is_deterministic() {
    let rows: &[&[&str]] = &[
        &["SET|I|0"],
        &["PEN_DOWN"],
        &["WHILE|I|<|7"],
        &["", "IF|I|/|2|>|1"],
        &["", "", "TURN|LEFT"],
        &["", "ELSE"],
        &["", "", "TURN|RIGHT|30"],
        &["", "MOVE|I|*|0.5"],
        &["", "SET|I|I|+|1"],
    ];

    let (first, _) = run_simulated(&program(rows), Options::default()).await;
    let (second, _) = run_simulated(&program(rows), Options::default()).await;

    assert_eq!(first.status, Status::Completed);
    assert_eq!(first.context, second.context);
}

#[tokio::test]
async fn result_serializes() {
    let result = simulate(&[&["SET|Z|10|/|0"]]).await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["status"], "Failed");
    assert_eq!(json["error"]["kind"]["kind"], "DivisionByZero");
    assert_eq!(json["error"]["location"]["row"], 0);
    assert_eq!(json["context"]["heading"], "FORWARD");
    assert_eq!(json["context"]["position"]["y"], 0.0);
}
