use crate::error::ErrorKind;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "http")]
pub mod http;
pub mod simulated;

#[cfg(feature = "http")]
pub use self::http::{CarHardware, CarSettings};
pub use self::simulated::{Action, SimulatedHardware};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: &'static str, timeout: Duration },
    #[error("device rejected {operation}: {reason}")]
    Rejected { operation: &'static str, reason: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response to {operation}: {detail}")]
    InvalidResponse { operation: &'static str, detail: String },
    #[error("simulated failure")]
    Injected,
}

impl From<Error> for ErrorKind {
    fn from(err: Error) -> ErrorKind {
        ErrorKind::HardwareUnavailable(err.to_string())
    }
}

/// Capabilities of the robot. Distances are signed grid units, angles
/// signed degrees with positive meaning clockwise.
pub trait Hardware {
    fn move_by(&mut self, units: f64) -> impl Future<Output = Result<(), Error>> + Send;
    fn turn_by(&mut self, degrees: f64) -> impl Future<Output = Result<(), Error>> + Send;
    /// Centimetres to the nearest obstacle ahead.
    fn read_distance(&mut self) -> impl Future<Output = Result<f64, Error>> + Send;
    /// `true` while the line sensor sees black.
    fn read_line_sensor(&mut self) -> impl Future<Output = Result<bool, Error>> + Send;
    fn pen(&mut self, down: bool) -> impl Future<Output = Result<(), Error>> + Send;
    fn alert(&mut self, on: bool) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Bounds a hardware call; running out of time counts as the device being unavailable.
pub async fn with_timeout<T, F>(operation: &'static str, timeout: Duration, call: F) -> Result<T, ErrorKind>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(ErrorKind::from),
        Err(_) => Err(Error::Timeout { operation, timeout }.into()),
    }
}
