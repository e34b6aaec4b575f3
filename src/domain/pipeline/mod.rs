//! Pipeline compilation domain module

mod compiler;
mod streams;

pub use compiler::{
    bitrate_kbps, CompiledPipeline, PipelineCompiler, HLS_MAX_FILES, HLS_PLAYLIST_LENGTH,
    HLS_TARGET_DURATION_SECS, MUX_NAME,
};
pub use streams::{LaunchMode, StreamMode, StreamPlan};
