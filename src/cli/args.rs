//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::config::{
    PartialAudioConfig, PartialFileConfig, PartialPipewireConfig, PartialRecorderConfig,
    PartialServerConfig, PartialVideoConfig,
};

/// Desktop recorder - screen and audio capture through gst-launch
#[derive(Parser, Debug)]
#[command(name = "desktop-recorder")]
#[command(version)]
#[command(about = "Record the desktop to a stream, file, TCP server or HLS playlist")]
#[command(long_about = None)]
pub struct Cli {
    /// Display session type (x11 selects ximagesrc, anything else pipewiresrc)
    #[arg(long, global = true, env = "XDG_SESSION_TYPE", value_name = "TYPE")]
    pub session_type: Option<String>,

    /// Log debug output and pass verbose diagnostics through
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Config file to read instead of the XDG default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start recording until interrupted
    Record(RecordArgs),
    /// Print the compiled gst-launch arguments without recording
    Args(RecordArgs),
    /// List audio capture sources
    Devices {
        /// Key sources as dev0, dev1, ...
        #[arg(long)]
        keyed: bool,
        /// Print JSON instead of one source per line
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Show config file path
    Path,
    /// Print the effective configuration
    Show,
}

/// Recording option overrides
#[derive(Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// Output kind: stdout, server, file, hls (aliases: m3u, m3u8)
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Container: matroska, mp4, mpegts (aliases: mkv, ts)
    #[arg(short = 'f', long)]
    pub format: Option<String>,

    /// x264 speed preset
    #[arg(long)]
    pub preset: Option<String>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub fps: Option<u32>,

    /// Video bitrate in megabits per second
    #[arg(long)]
    pub mbps: Option<f64>,

    /// Scale the capture to width x height
    #[arg(long)]
    pub scaling: Option<bool>,

    /// Letterbox instead of stretching when scaling
    #[arg(long)]
    pub borders: Option<bool>,

    /// PulseAudio source to record (see `devices`)
    #[arg(short = 'a', long = "audio-device", value_name = "DEVICE")]
    pub audio_device: Option<String>,

    /// Record without audio, even if the config file names a device
    #[arg(long, conflicts_with = "audio_device")]
    pub no_audio: bool,

    /// Audio encoder element, e.g. opusenc
    #[arg(long = "audio-encoder", value_name = "ELEMENT")]
    pub audio_encoder: Option<String>,

    /// Audio source buffer in microseconds
    #[arg(long = "audio-buffer", value_name = "USEC")]
    pub audio_buffer: Option<u64>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    /// Directory for file and hls outputs
    #[arg(short = 'd', long)]
    pub dir: Option<PathBuf>,

    /// File name without extension (default: timestamp)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// PipeWire node path for compositor sessions
    #[arg(long = "pipewire-path", value_name = "PATH")]
    pub pipewire_path: Option<String>,

    /// gst-launch executable
    #[arg(long = "tool", value_name = "PATH")]
    pub tool_path: Option<PathBuf>,
}

impl RecordArgs {
    /// Convert flags into a partial config; unset flags stay None.
    pub fn to_partial(&self, verbose: bool) -> PartialRecorderConfig {
        fn section<T: Default + PartialEq>(value: T) -> Option<T> {
            (value != T::default()).then_some(value)
        }

        PartialRecorderConfig {
            tool_path: self.tool_path.clone(),
            output: self.output.clone(),
            preset: self.preset.clone(),
            format: self.format.clone(),
            verbose: verbose.then_some(true),
            video: section(PartialVideoConfig {
                width: self.width,
                height: self.height,
                fps: self.fps,
                mbps: self.mbps,
                scaling: self.scaling,
                borders: self.borders,
            }),
            audio: section(PartialAudioConfig {
                device: if self.no_audio {
                    Some(None)
                } else {
                    self.audio_device.clone().map(Some)
                },
                buffer_us: self.audio_buffer,
                encoder: self.audio_encoder.clone().map(Some),
            }),
            server: section(PartialServerConfig {
                host: self.host.clone(),
                port: self.port,
            }),
            file: section(PartialFileConfig {
                dir: self.dir.clone(),
                name: self.name.clone().map(Some),
            }),
            pipewire: section(PartialPipewireConfig {
                path: self.pipewire_path.clone().map(Some),
            }),
        }
    }
}
