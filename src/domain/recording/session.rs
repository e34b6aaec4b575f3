//! Recorder process session state machine

use std::fmt;
use thiserror::Error;

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Launching,
    Running,
}

impl RecorderState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Launching => "launching",
            Self::Running => "running",
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: RecorderState,
    pub action: String,
}

/// The recorder's owned child process.
///
/// Every spawn gets a new generation. Transitions driven by process
/// observers carry the generation they were registered for and are ignored
/// once a newer process owns the session.
///
/// State machine:
///   IDLE -> LAUNCHING (spawned, launch detection)
///   IDLE -> RUNNING (spawned, streaming to stdout)
///   LAUNCHING -> RUNNING (launched)
///   LAUNCHING | RUNNING -> IDLE (exited)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSession {
    state: RecorderState,
    pid: Option<u32>,
    generation: u64,
}

impl ProcessSession {
    /// Create a new session with no process
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Pid of the owned process
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecorderState::Idle
    }

    /// Whether `generation` is the process currently owned
    pub fn owns(&self, generation: u64) -> bool {
        !self.is_idle() && self.generation == generation
    }

    /// Take ownership of a freshly spawned process and return its generation.
    pub fn spawned(&mut self, pid: u32, detect_launch: bool) -> u64 {
        self.generation += 1;
        self.pid = Some(pid);
        self.state = if detect_launch {
            RecorderState::Launching
        } else {
            RecorderState::Running
        };
        self.generation
    }

    /// Transition from LAUNCHING to RUNNING
    pub fn launched(&mut self, generation: u64) -> Result<(), InvalidStateTransition> {
        if self.state != RecorderState::Launching || self.generation != generation {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "complete launch".to_string(),
            });
        }
        self.state = RecorderState::Running;
        Ok(())
    }

    /// Release the process after it exited.
    /// Returns false when `generation` no longer owns the session.
    pub fn exited(&mut self, generation: u64) -> bool {
        if !self.owns(generation) {
            return false;
        }
        self.state = RecorderState::Idle;
        self.pid = None;
        true
    }
}
