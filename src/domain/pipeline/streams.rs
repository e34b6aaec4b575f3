//! Child process standard stream wiring

use std::process::Stdio;

use crate::domain::config::OutputKind;

/// How one standard stream of the child is connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Connected to /dev/null
    Null,
    /// Captured by the recorder
    Piped,
    /// Shared with the recorder's own stream
    Inherit,
}

impl StreamMode {
    pub fn to_stdio(self) -> Stdio {
        match self {
            Self::Null => Stdio::null(),
            Self::Piped => Stdio::piped(),
            Self::Inherit => Stdio::inherit(),
        }
    }
}

/// Standard stream plan for the launcher process.
///
/// stdin is always discarded. stdout is always piped: with `stdout` output it
/// carries the media stream handed to the caller, otherwise it carries the
/// launcher's progress messages used for launch detection. stderr is shared
/// with ours when verbose and discarded otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPlan {
    pub stdin: StreamMode,
    pub stdout: StreamMode,
    pub stderr: StreamMode,
}

impl StreamPlan {
    pub fn new(verbose: bool) -> Self {
        Self {
            stdin: StreamMode::Null,
            stdout: StreamMode::Piped,
            stderr: if verbose {
                StreamMode::Inherit
            } else {
                StreamMode::Null
            },
        }
    }
}

/// Launcher flags: quiet when stdout carries media, verbose otherwise.
/// Both send EOS on interrupt so the muxer can finalize the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    QuietEos,
    VerboseEos,
}

impl LaunchMode {
    pub const fn for_output(output: OutputKind) -> Self {
        match output {
            OutputKind::Stdout => Self::QuietEos,
            _ => Self::VerboseEos,
        }
    }

    pub const fn flag(&self) -> &'static str {
        match self {
            Self::QuietEos => "-qe",
            Self::VerboseEos => "-e",
        }
    }
}
