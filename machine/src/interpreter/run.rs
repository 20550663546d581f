use crate::interpreter::hardware::{Hardware, SimulatedHardware};
use crate::interpreter::progress::{CollectedProgress, ProgressSink, Severity};
use crate::interpreter::{ExecutionResult, Interpreter, Options};
use parser::ast::Program;
use tokio_util::sync::CancellationToken;

pub async fn run<H: Hardware, P: ProgressSink>(
    program: &Program,
    hardware: &mut H,
    progress: &mut P,
    cancel: CancellationToken,
    options: Options,
) -> ExecutionResult {
    let context = options.context();
    Interpreter::new(hardware, progress, cancel, options).run(program, context).await
}

/// Runs against a fresh [`SimulatedHardware`], returning it for inspection.
pub async fn run_simulated(program: &Program, options: Options) -> (ExecutionResult, SimulatedHardware) {
    let mut hardware = SimulatedHardware::new();
    let mut progress = CollectedProgress::new();
    let result = run(program, &mut hardware, &mut progress, CancellationToken::new(), options).await;

    (result, hardware)
}

pub async fn run_with_progress<H: Hardware>(program: &Program, hardware: &mut H, options: Options) -> (ExecutionResult, Vec<(Severity, String)>) {
    let mut progress = CollectedProgress::new();
    let result = run(program, hardware, &mut progress, CancellationToken::new(), options).await;

    (result, progress.into_messages())
}
