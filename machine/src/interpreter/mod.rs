use crate::context::{ExecutionContext, DEFAULT_STEP_LIMIT};
use crate::error::{ErrorKind, RuntimeError};
use crate::evaluate::{evaluate, LocalBoxFuture, Scalar, Sensors};
use crate::interpreter::hardware::{with_timeout, Hardware};
use crate::interpreter::progress::{ProgressSink, Severity};
use parser::ast::{Command, CommandKind, Direction, Location, Program, Value};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub mod hardware;
pub mod progress;
pub mod run;
#[cfg(test)]
mod tests;

/// Distance of a bare MOVE: far enough to mean "until stopped".
pub const DEFAULT_MOVE_SENTINEL: f64 = 999.0;
pub const DEFAULT_OBSTACLE_THRESHOLD_CM: f64 = 30.0;
pub const DEFAULT_HARDWARE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub step_limit: u64,
    pub move_sentinel: f64,
    pub obstacle_threshold_cm: f64,
    pub hardware_timeout: Duration,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            step_limit: DEFAULT_STEP_LIMIT,
            move_sentinel: DEFAULT_MOVE_SENTINEL,
            obstacle_threshold_cm: DEFAULT_OBSTACLE_THRESHOLD_CM,
            hardware_timeout: DEFAULT_HARDWARE_TIMEOUT,
        }
    }
}

impl Options {
    /// Fresh context honouring `step_limit`.
    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::with_step_limit(self.step_limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub context: ExecutionContext,
    pub status: Status,
    pub error: Option<RuntimeError>,
}

impl ExecutionResult {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}

/// Why a walk stopped early.
#[derive(Debug)]
enum Halt {
    Cancelled,
    Failed(RuntimeError),
}

fn failure(kind: ErrorKind, location: Location) -> Halt {
    Halt::Failed(RuntimeError::new(kind, location))
}

type Flow = Result<(), Halt>;

async fn guarded<T, F>(operation: &'static str, timeout: Duration, location: Location, call: F) -> Result<T, Halt>
where
    F: Future<Output = Result<T, hardware::Error>>,
{
    with_timeout(operation, timeout, call).await.map_err(|kind| failure(kind, location))
}

/// Sensor access for the evaluator, bounded by the hardware timeout.
struct Probe<'h, H> {
    hardware: &'h mut H,
    timeout: Duration,
    threshold: f64,
}

impl<H: Hardware> Sensors for Probe<'_, H> {
    async fn distance(&mut self) -> Result<f64, ErrorKind> {
        with_timeout("read distance", self.timeout, self.hardware.read_distance()).await
    }

    async fn line_detected(&mut self) -> Result<bool, ErrorKind> {
        with_timeout("read line sensor", self.timeout, self.hardware.read_line_sensor()).await
    }

    fn obstacle_threshold(&self) -> f64 {
        self.threshold
    }
}

/// Walks a program depth-first, one command at a time.
///
/// The hardware is borrowed for the whole run, so a device can never be
/// driven by two runs at once. Leaf commands consume one step each; the step
/// limit and the cancellation token are checked before every command and
/// before every loop iteration.
pub struct Interpreter<'a, H, P> {
    hardware: &'a mut H,
    progress: &'a mut P,
    cancel: CancellationToken,
    options: Options,
}

impl<'a, H: Hardware, P: ProgressSink> Interpreter<'a, H, P> {
    pub fn new(hardware: &'a mut H, progress: &'a mut P, cancel: CancellationToken, options: Options) -> Interpreter<'a, H, P> {
        Interpreter {
            hardware,
            progress,
            cancel,
            options,
        }
    }

    pub async fn run(&mut self, program: &Program, mut context: ExecutionContext) -> ExecutionResult {
        info!(commands = program.commands.len(), step_limit = context.step_limit, "starting run");

        let outcome = self.execute_commands(&program.commands, &mut context).await;

        let (status, error) = match outcome {
            Ok(()) => {
                self.emit(Severity::Success, &format!("Program completed after {} steps", context.step_count));
                (Status::Completed, None)
            },
            Err(Halt::Cancelled) => {
                self.emit(Severity::Warning, &format!("Execution cancelled after {} steps", context.step_count));
                (Status::Cancelled, None)
            },
            Err(Halt::Failed(err)) => {
                self.emit(Severity::Error, &format!("Execution failed: {}", err));
                (Status::Failed, Some(err))
            },
        };
        info!(?status, steps = context.step_count, "run finished");

        ExecutionResult { context, status, error }
    }

    fn emit(&mut self, severity: Severity, message: &str) {
        self.progress.emit(severity, message);
    }

    fn execute_commands<'s>(&'s mut self, commands: &'s [Command], context: &'s mut ExecutionContext) -> LocalBoxFuture<'s, Flow> {
        Box::pin(async move {
            for command in commands {
                self.execute(command, context).await?;
            }
            Ok(())
        })
    }

    fn checkpoint(&self) -> Flow {
        if self.cancel.is_cancelled() {
            debug!("cancellation observed");
            Err(Halt::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Runs before every loop iteration so unbounded loops stay responsive.
    async fn iteration(&self) -> Flow {
        self.checkpoint()?;
        tokio::task::yield_now().await;
        self.checkpoint()
    }

    async fn eval(&mut self, value: &Value, context: &ExecutionContext, location: Location) -> Result<Scalar, Halt> {
        let mut probe = Probe {
            hardware: &mut *self.hardware,
            timeout: self.options.hardware_timeout,
            threshold: self.options.obstacle_threshold_cm,
        };

        evaluate(value, context, &mut probe).await.map_err(|kind| failure(kind, location))
    }

    async fn number(&mut self, what: &str, value: &Value, context: &ExecutionContext, location: Location) -> Result<f64, Halt> {
        match self.eval(value, context, location).await? {
            Scalar::Number(num) => Ok(num),
            other => Err(failure(
                ErrorKind::TypeMismatch(format!("{} needs a number, got {}", what, other.type_name())),
                location,
            )),
        }
    }

    async fn condition(&mut self, what: &str, value: &Value, context: &ExecutionContext, location: Location) -> Result<bool, Halt> {
        match self.eval(value, context, location).await? {
            Scalar::Boolean(b) => Ok(b),
            other => Err(failure(
                ErrorKind::TypeMismatch(format!("{} needs a boolean, got {}", what, other.type_name())),
                location,
            )),
        }
    }

    async fn turn_delta(&mut self, direction: Option<Direction>, degrees: Option<&Value>, context: &ExecutionContext, location: Location) -> Result<f64, Halt> {
        let magnitude = match degrees {
            Some(value) => Some(self.number("TURN", value, context, location).await?),
            None => None,
        };

        let delta = match (direction, magnitude) {
            (None, None) => 90.0,
            (None, Some(signed)) => signed,
            (Some(Direction::Right), magnitude) => magnitude.map_or(90.0, f64::abs),
            (Some(Direction::Left), magnitude) => -magnitude.map_or(90.0, f64::abs),
            (Some(Direction::Backward), _) => 180.0,
            (Some(Direction::Forward), _) => 0.0,
        };

        Ok(delta)
    }

    async fn execute(&mut self, command: &Command, context: &mut ExecutionContext) -> Flow {
        let location = command.location;
        let timeout = self.options.hardware_timeout;

        if context.limit_reached() {
            return Err(failure(ErrorKind::StepLimitExceeded(context.step_limit), location));
        }
        self.checkpoint()?;

        self.emit(Severity::Info, &format!("Executing {} at {}", command.name(), location));

        match &command.kind {
            CommandKind::Move { distance } => {
                let units = match distance {
                    Some(value) => self.number("MOVE", value, context, location).await?,
                    None => self.options.move_sentinel,
                };
                guarded("move", timeout, location, self.hardware.move_by(units)).await?;
                context.advance(units);
                context.step_count += 1;
                self.emit(Severity::Debug, &format!("Moved {} units to {}", units, context.position));
            },
            CommandKind::Turn { direction, degrees } => {
                let delta = self.turn_delta(*direction, degrees.as_ref(), context, location).await?;
                guarded("turn", timeout, location, self.hardware.turn_by(delta)).await?;
                context.turn(delta);
                context.step_count += 1;
                self.emit(Severity::Debug, &format!("Turned {} degrees, now facing {}", delta, context.heading));
            },
            CommandKind::Loop { count, body } => match self.eval(count, context, location).await? {
                Scalar::Boolean(false) => {},
                Scalar::Boolean(true) => loop {
                    self.iteration().await?;
                    self.execute_commands(body, context).await?;
                },
                Scalar::Number(times) => {
                    let times = if times > 0.0 { times.trunc() as u64 } else { 0 };
                    for _ in 0..times {
                        self.iteration().await?;
                        self.execute_commands(body, context).await?;
                    }
                },
            },
            CommandKind::While { condition, body } => loop {
                self.iteration().await?;
                if !self.condition("WHILE", condition, context, location).await? {
                    break;
                }
                self.execute_commands(body, context).await?;
            },
            CommandKind::If { condition, positive, negative } => {
                if self.condition("IF", condition, context, location).await? {
                    self.execute_commands(positive, context).await?;
                } else if let Some(negative) = negative {
                    self.execute_commands(negative, context).await?;
                }
            },
            CommandKind::Set { name, value } => {
                let scalar = self.eval(value, context, location).await?;
                context.set_variable(name, scalar);
                context.step_count += 1;
                self.emit(Severity::Debug, &format!("{} = {}", name, scalar));
            },
            CommandKind::Wait { seconds } => {
                let mut seconds = self.number("WAIT", seconds, context, location).await?;
                if seconds < 0.0 {
                    warn!(seconds, "negative WAIT treated as zero");
                    self.emit(Severity::Warning, &format!("WAIT of {} seconds treated as 0", seconds));
                    seconds = 0.0;
                }
                let duration = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX);

                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(Halt::Cancelled),
                    _ = tokio::time::sleep(duration) => {},
                }
                context.step_count += 1;
            },
            CommandKind::PenDown | CommandKind::PenUp => {
                let down = matches!(command.kind, CommandKind::PenDown);
                guarded("pen", timeout, location, self.hardware.pen(down)).await?;
                context.pen_down = down;
                context.step_count += 1;
            },
            CommandKind::AlertOn | CommandKind::AlertOff => {
                let on = matches!(command.kind, CommandKind::AlertOn);
                guarded("alert", timeout, location, self.hardware.alert(on)).await?;
                context.step_count += 1;
            },
        }

        Ok(())
    }
}
