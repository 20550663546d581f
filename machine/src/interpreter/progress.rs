use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Receives human readable progress. Implementations must return promptly.
pub trait ProgressSink {
    fn emit(&mut self, severity: Severity, message: &str);
}

impl<F: FnMut(Severity, &str)> ProgressSink for F {
    fn emit(&mut self, severity: Severity, message: &str) {
        self(severity, message)
    }
}

/// Forwards progress to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => debug!(target: "progress", "{}", message),
            Severity::Info => info!(target: "progress", "{}", message),
            Severity::Success => info!(target: "progress", success = true, "{}", message),
            Severity::Warning => warn!(target: "progress", "{}", message),
            Severity::Error => error!(target: "progress", "{}", message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollectedProgress {
    messages: Vec<(Severity, String)>,
}

impl CollectedProgress {
    pub fn new() -> CollectedProgress {
        CollectedProgress::default()
    }

    pub fn messages(&self) -> &[(Severity, String)] {
        &self.messages
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.messages.iter()
            .filter(move |(s, _)| *s == severity)
            .map(|(_, message)| message.as_str())
    }

    pub fn into_messages(self) -> Vec<(Severity, String)> {
        self.messages
    }
}

impl ProgressSink for CollectedProgress {
    fn emit(&mut self, severity: Severity, message: &str) {
        self.messages.push((severity, message.to_owned()));
    }
}

/// Sends progress over an unbounded channel, so emitting never waits on the reader.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    sender: mpsc::UnboundedSender<(Severity, String)>,
}

impl ChannelProgress {
    pub fn channel() -> (ChannelProgress, mpsc::UnboundedReceiver<(Severity, String)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (ChannelProgress { sender }, receiver)
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&mut self, severity: Severity, message: &str) {
        // a dropped receiver only means nobody is listening any more
        let _ = self.sender.send((severity, message.to_owned()));
    }
}
