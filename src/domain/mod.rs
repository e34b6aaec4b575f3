//! Domain layer - Core recorder logic
//!
//! Contains configuration value objects, the pipeline compiler, the
//! process session state machine and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod recording;

// Re-export common types
pub use capture::SessionType;
pub use config::{PartialRecorderConfig, RecorderConfig};
pub use error::*;
pub use pipeline::{CompiledPipeline, PipelineCompiler};
pub use recording::{ProcessSession, RecorderState, SessionFileName};
