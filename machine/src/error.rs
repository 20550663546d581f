use parser::ast::Location;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum ErrorKind {
    #[error("variable `{0}` is read before it is set")]
    UndefinedVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("step limit of {0} reached")]
    StepLimitExceeded(u64),
    #[error("hardware unavailable: {0}")]
    HardwareUnavailable(String),
}

/// A fault that aborted the run, located at the offending command.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind} at {location}")]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub location: Location,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, location: Location) -> RuntimeError {
        RuntimeError { kind, location }
    }
}
