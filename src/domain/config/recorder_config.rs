//! Recorder configuration value objects

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Default path of the external pipeline launcher
pub const DEFAULT_TOOL_PATH: &str = "/usr/bin/gst-launch-1.0";

/// Optional key of a partial config. `None` leaves the lower layer alone,
/// `Some(None)` is an explicit null that clears it.
pub type Nullable<T> = Option<Option<T>>;

/// A key that is present, even as null, deserializes to `Some(_)`.
fn present<'de, D, T>(deserializer: D) -> Result<Nullable<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Video capture and encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub mbps: f64,
    pub scaling: bool,
    pub borders: bool,
}

/// Audio branch settings. `device: None` disables the audio branch,
/// `encoder: None` muxes raw audio as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub buffer_us: u64,
    pub encoder: Option<String>,
}

/// TCP server sink settings (output = server).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// File sink settings (output = file / hls). `name: None` means a
/// timestamp name is generated for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub dir: PathBuf,
    pub name: Option<String>,
}

/// PipeWire source settings, used by the compositor capture backend.
/// `path: None` captures from the default node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipewireConfig {
    pub path: Option<String>,
}

/// Fully resolved recorder configuration.
///
/// `output` and `format` stay free-form here and are validated when the
/// pipeline is compiled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    pub tool_path: PathBuf,
    pub output: String,
    pub preset: String,
    pub format: String,
    pub verbose: bool,
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub server: ServerConfig,
    pub file: FileConfig,
    pub pipewire: PipewireConfig,
}

impl RecorderConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            tool_path: PathBuf::from(DEFAULT_TOOL_PATH),
            output: "stdout".to_string(),
            preset: "superfast".to_string(),
            format: "matroska".to_string(),
            verbose: false,
            video: VideoConfig {
                width: 1920,
                height: 1080,
                fps: 30,
                mbps: 4.0,
                scaling: false,
                borders: true,
            },
            audio: AudioConfig {
                device: None,
                buffer_us: 40_000,
                encoder: None,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            file: FileConfig {
                dir: PathBuf::from("/tmp"),
                name: None,
            },
            pipewire: PipewireConfig { path: None },
        }
    }

    /// Layer a partial config on top of this one and return the result.
    /// Only values present in `other` override; an explicit null clears
    /// an optional value.
    pub fn merge(self, other: PartialRecorderConfig) -> Self {
        Self {
            tool_path: other.tool_path.unwrap_or(self.tool_path),
            output: other.output.unwrap_or(self.output),
            preset: other.preset.unwrap_or(self.preset),
            format: other.format.unwrap_or(self.format),
            verbose: other.verbose.unwrap_or(self.verbose),
            video: match other.video {
                Some(v) => VideoConfig {
                    width: v.width.unwrap_or(self.video.width),
                    height: v.height.unwrap_or(self.video.height),
                    fps: v.fps.unwrap_or(self.video.fps),
                    mbps: v.mbps.unwrap_or(self.video.mbps),
                    scaling: v.scaling.unwrap_or(self.video.scaling),
                    borders: v.borders.unwrap_or(self.video.borders),
                },
                None => self.video,
            },
            audio: match other.audio {
                Some(a) => AudioConfig {
                    device: a.device.unwrap_or(self.audio.device),
                    buffer_us: a.buffer_us.unwrap_or(self.audio.buffer_us),
                    encoder: a.encoder.unwrap_or(self.audio.encoder),
                },
                None => self.audio,
            },
            server: match other.server {
                Some(s) => ServerConfig {
                    host: s.host.unwrap_or(self.server.host),
                    port: s.port.unwrap_or(self.server.port),
                },
                None => self.server,
            },
            file: match other.file {
                Some(f) => FileConfig {
                    dir: f.dir.unwrap_or(self.file.dir),
                    name: f.name.unwrap_or(self.file.name),
                },
                None => self.file,
            },
            pipewire: match other.pipewire {
                Some(p) => PipewireConfig {
                    path: p.path.unwrap_or(self.pipewire.path),
                },
                None => self.pipewire,
            },
        }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialVideoConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub mbps: Option<f64>,
    pub scaling: Option<bool>,
    pub borders: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialAudioConfig {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub device: Nullable<String>,
    pub buffer_us: Option<u64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub encoder: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialFileConfig {
    pub dir: Option<PathBuf>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPipewireConfig {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub path: Nullable<String>,
}

/// User supplied configuration.
/// All fields are optional to support partial configs and merging.
/// Keys outside this schema are dropped on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialRecorderConfig {
    pub tool_path: Option<PathBuf>,
    pub output: Option<String>,
    pub preset: Option<String>,
    pub format: Option<String>,
    pub verbose: Option<bool>,
    pub video: Option<PartialVideoConfig>,
    pub audio: Option<PartialAudioConfig>,
    pub server: Option<PartialServerConfig>,
    pub file: Option<PartialFileConfig>,
    pub pipewire: Option<PartialPipewireConfig>,
}

impl PartialRecorderConfig {
    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge two partial configs, where other takes precedence.
    pub fn layer(self, other: Self) -> Self {
        Self {
            tool_path: other.tool_path.or(self.tool_path),
            output: other.output.or(self.output),
            preset: other.preset.or(self.preset),
            format: other.format.or(self.format),
            verbose: other.verbose.or(self.verbose),
            video: match (self.video, other.video) {
                (Some(b), Some(o)) => Some(PartialVideoConfig {
                    width: o.width.or(b.width),
                    height: o.height.or(b.height),
                    fps: o.fps.or(b.fps),
                    mbps: o.mbps.or(b.mbps),
                    scaling: o.scaling.or(b.scaling),
                    borders: o.borders.or(b.borders),
                }),
                (b, o) => o.or(b),
            },
            audio: match (self.audio, other.audio) {
                (Some(b), Some(o)) => Some(PartialAudioConfig {
                    device: o.device.or(b.device),
                    buffer_us: o.buffer_us.or(b.buffer_us),
                    encoder: o.encoder.or(b.encoder),
                }),
                (b, o) => o.or(b),
            },
            server: match (self.server, other.server) {
                (Some(b), Some(o)) => Some(PartialServerConfig {
                    host: o.host.or(b.host),
                    port: o.port.or(b.port),
                }),
                (b, o) => o.or(b),
            },
            file: match (self.file, other.file) {
                (Some(b), Some(o)) => Some(PartialFileConfig {
                    dir: o.dir.or(b.dir),
                    name: o.name.or(b.name),
                }),
                (b, o) => o.or(b),
            },
            pipewire: match (self.pipewire, other.pipewire) {
                (Some(b), Some(o)) => Some(PartialPipewireConfig {
                    path: o.path.or(b.path),
                }),
                (b, o) => o.or(b),
            },
        }
    }
}

impl From<RecorderConfig> for PartialRecorderConfig {
    fn from(config: RecorderConfig) -> Self {
        Self {
            tool_path: Some(config.tool_path),
            output: Some(config.output),
            preset: Some(config.preset),
            format: Some(config.format),
            verbose: Some(config.verbose),
            video: Some(PartialVideoConfig {
                width: Some(config.video.width),
                height: Some(config.video.height),
                fps: Some(config.video.fps),
                mbps: Some(config.video.mbps),
                scaling: Some(config.video.scaling),
                borders: Some(config.video.borders),
            }),
            audio: Some(PartialAudioConfig {
                device: config.audio.device.map(Some),
                buffer_us: Some(config.audio.buffer_us),
                encoder: config.audio.encoder.map(Some),
            }),
            server: Some(PartialServerConfig {
                host: Some(config.server.host),
                port: Some(config.server.port),
            }),
            file: Some(PartialFileConfig {
                dir: Some(config.file.dir),
                name: config.file.name.map(Some),
            }),
            pipewire: Some(PartialPipewireConfig {
                path: config.pipewire.path.map(Some),
            }),
        }
    }
}
