//! Shutdown signal handling

use std::fmt;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// OS request to stop recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM
    Terminate,
}

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Listener for SIGINT and SIGTERM.
///
/// The recorder child runs in its own process group, so a terminal Ctrl+C
/// only reaches this process; the runner forwards it through `stop`.
pub struct ShutdownSignal {
    sigint: Signal,
    sigterm: Signal,
}

impl ShutdownSignal {
    /// Register the signal handlers
    pub fn setup() -> Result<Self, std::io::Error> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the next shutdown request
    pub async fn recv(&mut self) -> Shutdown {
        tokio::select! {
            _ = self.sigint.recv() => Shutdown::Interrupt,
            _ = self.sigterm.recv() => Shutdown::Terminate,
        }
    }
}
