//! Audio device listing port interface

use thiserror::Error;

/// Device query errors
#[derive(Debug, Clone, Error)]
pub enum DeviceQueryError {
    #[error("Failed to run device query: {0}")]
    CommandFailed(String),

    #[error("Device query exited with status {0}")]
    NonZeroExit(i32),
}

/// Port for querying the host audio subsystem.
/// Implementations block until the query tool has finished.
pub trait DeviceLister: Send + Sync {
    /// Raw `name: <device-id>` listing of the capture sources
    fn list_sources(&self) -> Result<String, DeviceQueryError>;
}

impl DeviceLister for Box<dyn DeviceLister> {
    fn list_sources(&self) -> Result<String, DeviceQueryError> {
        self.as_ref().list_sources()
    }
}
