//! Generated output file names

use chrono::NaiveDateTime;

/// Prefix of every generated recording name
pub const FILE_NAME_PREFIX: &str = "desktop_";

/// Build a timestamp name such as `desktop_2024-03-09_07:05:01`.
pub fn timestamp_file_name(now: NaiveDateTime) -> String {
    format!("{}{}", FILE_NAME_PREFIX, now.format("%Y-%m-%d_%H:%M:%S"))
}

/// Output name for one recorder session.
///
/// A generated name is kept once resolved, so compiling the pipeline again
/// within the same session writes to the same file. Starting a new session
/// resets it.
#[derive(Debug, Clone, Default)]
pub struct SessionFileName {
    generated: Option<String>,
}

impl SessionFileName {
    pub fn new() -> Self {
        Self { generated: None }
    }

    /// Return the configured name, or the session's generated one.
    /// `now` is only consulted the first time a name has to be generated.
    pub fn resolve<F>(&mut self, configured: Option<&str>, now: F) -> String
    where
        F: FnOnce() -> NaiveDateTime,
    {
        if let Some(name) = configured {
            return name.to_string();
        }
        self.generated
            .get_or_insert_with(|| timestamp_file_name(now()))
            .clone()
    }

    /// The name generated so far, if any
    pub fn generated(&self) -> Option<&str> {
        self.generated.as_deref()
    }

    /// Forget the generated name; the next resolve creates a new one.
    pub fn reset(&mut self) {
        self.generated = None;
    }
}
