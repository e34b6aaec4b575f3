//! Recording port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::ChildStdout;
use tokio::sync::oneshot;

use crate::domain::error::CompileError;
use crate::domain::recording::RecorderState;

/// Recording errors
#[derive(Debug, Clone, Error)]
pub enum RecorderError {
    #[error("Invalid pipeline configuration: {0}")]
    Compile(#[from] CompileError),

    #[error("Failed to spawn pipeline: {0}")]
    SpawnFailure(String),

    #[error("Pipeline could not start")]
    LaunchTimeout,

    #[error("Pipeline launch was cancelled by stop")]
    LaunchCancelled,

    #[error("Failed to signal pipeline: {0}")]
    SignalFailure(String),
}

/// Pending launch of a recording whose output is not stdout.
///
/// Resolves exactly once: `Ok(())` when the pipeline went quiet while still
/// running, `LaunchTimeout` when it exited first, `LaunchCancelled` when
/// the recording was stopped before it settled.
#[derive(Debug)]
pub struct LaunchHandle {
    result: oneshot::Receiver<Result<(), RecorderError>>,
}

impl LaunchHandle {
    pub fn new(result: oneshot::Receiver<Result<(), RecorderError>>) -> Self {
        Self { result }
    }

    /// Wait until the launch outcome is known
    pub async fn launched(self) -> Result<(), RecorderError> {
        self.result
            .await
            .unwrap_or(Err(RecorderError::LaunchCancelled))
    }

    /// Invoke `callback` with the launch outcome once it is known.
    pub fn on_launched<F>(self, callback: F)
    where
        F: FnOnce(Result<(), RecorderError>) + Send + 'static,
    {
        tokio::spawn(async move {
            callback(self.launched().await);
        });
    }
}

/// A started recording
#[derive(Debug)]
pub enum Recording {
    /// Output is stdout: the encoded media stream, unbuffered
    Stream(ChildStdout),
    /// Any other output: wait on the handle for the pipeline to settle
    Launching(LaunchHandle),
}

/// Port for a supervised screen recording process
#[async_trait]
pub trait ScreenRecorder: Send + Sync {
    /// Start a recording, stopping any recording still owned first.
    ///
    /// Configuration errors are returned before anything is spawned.
    async fn start(&self) -> Result<Recording, RecorderError>;

    /// Ask the pipeline to finish the container and exit.
    ///
    /// Returns `SignalFailure` when no process is owned.
    async fn stop(&self) -> Result<(), RecorderError>;

    /// Current lifecycle state
    fn state(&self) -> RecorderState;

    /// Wait until no process is owned
    async fn wait_until_idle(&self);
}
