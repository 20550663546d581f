use crate::config::{self, Config};
use crate::verifier::{verify, Summary, Verification, Warning};
use machine::interpreter::hardware::Hardware;
use machine::interpreter::progress::{ProgressSink, Severity};
use machine::{ExecutionResult, Interpreter, Status};
use parser::ast::{Location, Program};
use parser::{Grid, ParseError, Parser};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseFailure {
    pub message: String,
    pub location: Location,
}

impl From<&ParseError> for ParseFailure {
    fn from(err: &ParseError) -> ParseFailure {
        ParseFailure {
            message: err.kind.to_string(),
            location: err.location,
        }
    }
}

/// Outcome of one grid run, as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub shape: (usize, usize),
    pub status: Status,
    pub warnings: Vec<Warning>,
    pub summary: Option<Summary>,
    pub parse_error: Option<ParseFailure>,
    pub result: Option<ExecutionResult>,
}

impl Report {
    pub fn exit_code(&self) -> i32 {
        match self.status {
            Status::Completed => 0,
            Status::Failed => 1,
            Status::Cancelled => 130,
        }
    }
}

/// Parses and statically checks a grid without running it.
pub fn check(grid: &Grid, config: &Config) -> Result<(Program, Verification), Error> {
    let parser = Parser::with_keywords(config.keywords()?);
    let program = parser.parse(grid)?;
    let verification = verify(&program);

    Ok((program, verification))
}

fn announce_shape<P: ProgressSink>(grid: &Grid, config: &Config, progress: &mut P) {
    let (rows, cols) = grid.shape();
    info!(rows, cols, "grid loaded");
    progress.emit(Severity::Info, &format!("Grid of {} rows and {} columns", rows, cols));

    let expected = (config.grid.rows, config.grid.cols);
    if (rows, cols) != expected || !grid.is_rectangular() {
        warn!(rows, cols, ?expected, "unexpected grid shape");
        progress.emit(
            Severity::Warning,
            &format!("Expected a {}x{} grid, running it anyway", expected.0, expected.1),
        );
    }
}

pub async fn execute_grid<H: Hardware, P: ProgressSink>(
    grid: &Grid,
    config: &Config,
    hardware: &mut H,
    progress: &mut P,
    cancel: CancellationToken,
) -> Result<Report, Error> {
    announce_shape(grid, config, progress);

    let (program, verification) = match check(grid, config) {
        Ok(checked) => checked,
        Err(Error::Parse(err)) => {
            progress.emit(Severity::Error, &format!("Parse error: {}", err));
            return Ok(Report {
                shape: grid.shape(),
                status: Status::Failed,
                warnings: vec![],
                summary: None,
                parse_error: Some(ParseFailure::from(&err)),
                result: None,
            });
        },
        Err(err) => return Err(err),
    };

    for warning in &verification.warnings {
        progress.emit(Severity::Warning, &warning.to_string());
    }
    progress.emit(
        Severity::Info,
        &format!("Parsed {} commands, nesting depth {}", verification.summary.leaf_commands, verification.summary.max_depth),
    );

    let options = config.engine_options();
    let context = options.context();
    let result = Interpreter::new(hardware, progress, cancel, options).run(&program, context).await;

    let context = &result.context;
    progress.emit(
        Severity::Info,
        &format!("Final position {} facing {} after {} steps", context.position, context.heading, context.step_count),
    );

    Ok(Report {
        shape: grid.shape(),
        status: result.status,
        warnings: verification.warnings,
        summary: Some(verification.summary),
        parse_error: None,
        result: Some(result),
    })
}
