pub mod context;
mod error;
pub mod evaluate;
pub mod interpreter;

pub use crate::context::{ExecutionContext, Heading, Position, Segment};
pub use crate::error::{ErrorKind, RuntimeError};
pub use crate::evaluate::Scalar;
pub use crate::interpreter::{ExecutionResult, Interpreter, Options, Status};
