//! PulseAudio `pacmd` device lister

use std::process::{Command, Stdio};

use tracing::debug;

use crate::application::ports::{DeviceLister, DeviceQueryError};

/// Shell pipeline printing one `name: <id>` line per capture source
const LIST_SOURCES: &str = r#"pacmd list-sources | grep -e "name:""#;

/// Lists sources through the PulseAudio command line
#[derive(Debug, Clone)]
pub struct PacmdDeviceLister {
    shell: String,
    query: String,
}

impl PacmdDeviceLister {
    pub fn new() -> Self {
        Self {
            shell: "sh".to_string(),
            query: LIST_SOURCES.to_string(),
        }
    }

    /// Run a different shell query
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::new()
        }
    }
}

impl Default for PacmdDeviceLister {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceLister for PacmdDeviceLister {
    fn list_sources(&self) -> Result<String, DeviceQueryError> {
        debug!(query = %self.query, "Querying audio sources");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&self.query)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| DeviceQueryError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            return Err(DeviceQueryError::NonZeroExit(
                output.status.code().unwrap_or(-1),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
