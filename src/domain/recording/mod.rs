//! Recording domain module

mod file_name;
mod session;

pub use file_name::{timestamp_file_name, SessionFileName, FILE_NAME_PREFIX};
pub use session::{InvalidStateTransition, ProcessSession, RecorderState};
