//! Recorder configuration domain module

mod formats;
mod recorder_config;
mod resolve;

pub use formats::{ContainerFormat, OutputKind};
pub use recorder_config::{
    AudioConfig, FileConfig, Nullable, PartialAudioConfig, PartialFileConfig,
    PartialPipewireConfig, PartialRecorderConfig, PartialServerConfig, PartialVideoConfig,
    PipewireConfig, RecorderConfig, ServerConfig, VideoConfig, DEFAULT_TOOL_PATH,
};
pub use resolve::{expand_home, normalize_path, resolve_options};
