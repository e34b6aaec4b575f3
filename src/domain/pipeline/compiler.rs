//! Configuration to gst-launch argument compiler
//!
//! The launcher parses its arguments as one pipeline description, so the
//! order of the emitted tokens is significant:
//!
//! ```text
//! <flag> <video source> ! queue ! videorate ! caps [! videoscale ! caps] ! videoconvert
//!        ! queue ! x264enc ! h264parse ! caps ! <muxer> name=mux ! <sink>
//!        [<audio source> ! queue ! audiorate ! caps [! audioconvert ! queue ! <encoder>] ! mux.]
//! ```

use std::path::{Path, PathBuf};

use crate::domain::capture::SessionType;
use crate::domain::config::{AudioConfig, ContainerFormat, OutputKind, RecorderConfig};
use crate::domain::error::CompileError;

use super::streams::{LaunchMode, StreamPlan};

/// Name given to the muxer so the audio branch can link to it
pub const MUX_NAME: &str = "mux";

/// HLS segment window
pub const HLS_TARGET_DURATION_SECS: u32 = 1;
pub const HLS_PLAYLIST_LENGTH: u32 = 3;
pub const HLS_MAX_FILES: u32 = 6;

/// Result of compiling a configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPipeline {
    /// Arguments for the launcher, launch flag first
    pub args: Vec<String>,
    /// File extension implied by the container format
    pub extension: &'static str,
    pub streams: StreamPlan,
    pub output: OutputKind,
    pub format: ContainerFormat,
    /// Recording file (file output) or segment directory (hls output)
    pub location: Option<PathBuf>,
}

impl CompiledPipeline {
    /// Whether the caller receives the media stream on stdout
    pub fn streams_to_stdout(&self) -> bool {
        self.output == OutputKind::Stdout
    }
}

/// Token list under construction
#[derive(Debug, Default)]
struct LaunchLine {
    tokens: Vec<String>,
}

impl LaunchLine {
    fn push(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    /// Link a new element: `! <element>`
    fn link(&mut self, element: impl Into<String>) -> &mut Self {
        self.push("!").push(element)
    }

    fn extend<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    /// Queue that drops old buffers instead of blocking upstream
    fn leaky_queue(&mut self) -> &mut Self {
        self.link("queue").extend([
            "leaky=2",
            "max-size-buffers=0",
            "max-size-time=0",
            "max-size-bytes=0",
        ])
    }

    fn into_tokens(self) -> Vec<String> {
        self.tokens
    }
}

/// Encoder bitrate in kbit/s (decimal)
pub fn bitrate_kbps(mbps: f64) -> u64 {
    (mbps * 1000.0).round() as u64
}

/// Compiles a resolved configuration into launcher arguments.
/// The capture source is fixed by the session type for the compiler's lifetime.
#[derive(Debug, Clone, Copy)]
pub struct PipelineCompiler {
    session_type: SessionType,
}

impl PipelineCompiler {
    pub fn new(session_type: SessionType) -> Self {
        Self { session_type }
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// Compile `config`, writing file output under `file_name`.
    ///
    /// Fails with `PathNotFound` when the launcher or the output directory
    /// is missing and with `UnsupportedOption` for an unknown format/output.
    pub fn compile(
        &self,
        config: &RecorderConfig,
        file_name: &str,
    ) -> Result<CompiledPipeline, CompileError> {
        if !config.tool_path.exists() {
            return Err(CompileError::PathNotFound {
                what: "Executable",
                path: config.tool_path.clone(),
            });
        }

        let format: ContainerFormat = config.format.parse()?;
        let output: OutputKind = config.output.parse()?;

        let mut line = LaunchLine::default();
        line.push(LaunchMode::for_output(output).flag());
        self.video_branch(&mut line, config);
        Self::muxer(&mut line, format, output);
        let location = Self::sink(&mut line, config, output, format, file_name)?;
        if let Some(device) = config.audio.device.as_deref() {
            Self::audio_branch(&mut line, &config.audio, device);
        }

        Ok(CompiledPipeline {
            args: line.into_tokens(),
            extension: format.extension(),
            streams: StreamPlan::new(config.verbose),
            output,
            format,
            location,
        })
    }

    fn video_branch(&self, line: &mut LaunchLine, config: &RecorderConfig) {
        let video = &config.video;

        line.extend(self.session_type.video_source(config.pipewire.path.as_deref()));
        line.leaky_queue()
            .link("videorate")
            .link(format!("video/x-raw,framerate={}/1", video.fps));

        if video.scaling {
            line.link("videoscale")
                .push(format!("add-borders={}", video.borders))
                .link(format!(
                    "video/x-raw,width={},height={},pixel-aspect-ratio=1/1",
                    video.width, video.height
                ));
        }

        line.link("videoconvert")
            .link("queue")
            .link("x264enc")
            .extend(["sliced-threads=true", "tune=zerolatency"])
            .push(format!("speed-preset={}", config.preset))
            .push(format!("bitrate={}", bitrate_kbps(video.mbps)))
            .push(format!("key-int-max={}", video.fps * 2))
            .link("h264parse")
            .link("video/x-h264,profile=main");
    }

    fn muxer(line: &mut LaunchLine, format: ContainerFormat, output: OutputKind) {
        let streamable = output != OutputKind::File;

        line.link(format.muxer()).push(format!("name={}", MUX_NAME));
        match format {
            ContainerFormat::Matroska => {
                line.push(format!("streamable={}", streamable));
            }
            ContainerFormat::Mp4 => {
                line.push(format!("streamable={}", streamable))
                    .push("fragment-duration=1");
            }
            ContainerFormat::MpegTs => {}
        }
    }

    fn sink(
        line: &mut LaunchLine,
        config: &RecorderConfig,
        output: OutputKind,
        format: ContainerFormat,
        file_name: &str,
    ) -> Result<Option<PathBuf>, CompileError> {
        if output.writes_to_dir() && !config.file.dir.is_dir() {
            return Err(CompileError::PathNotFound {
                what: "Directory",
                path: config.file.dir.clone(),
            });
        }

        let location = match output {
            OutputKind::Stdout => {
                line.link("fdsink").extend(["fd=1", "sync=false"]);
                None
            }
            OutputKind::Server => {
                line.link("tcpserversink")
                    .push(format!("host={}", config.server.host))
                    .push(format!("port={}", config.server.port))
                    .push("sync=false");
                None
            }
            OutputKind::File => {
                let path = config
                    .file
                    .dir
                    .join(format!("{}{}", file_name, format.extension()));
                line.link("filesink")
                    .push(format!("location={}", path.display()))
                    .push("sync=false");
                Some(path)
            }
            OutputKind::Hls => {
                let dir: &Path = &config.file.dir;
                line.link("hlssink")
                    .push("async-handling=true")
                    .push(format!(
                        "location={}/segment%05d{}",
                        dir.display(),
                        format.extension()
                    ))
                    .push(format!("playlist-location={}/playlist.m3u8", dir.display()))
                    .push(format!("target-duration={}", HLS_TARGET_DURATION_SECS))
                    .push(format!("playlist-length={}", HLS_PLAYLIST_LENGTH))
                    .push(format!("max-files={}", HLS_MAX_FILES));
                Some(dir.to_path_buf())
            }
        };

        Ok(location)
    }

    fn audio_branch(line: &mut LaunchLine, audio: &AudioConfig, device: &str) {
        line.push("pulsesrc")
            .push(format!("device={}", device))
            .extend(["provide-clock=true", "do-timestamp=true"])
            .push(format!("buffer-time={}", audio.buffer_us));
        line.leaky_queue()
            .link("audiorate")
            .push("skip-to-first=true")
            .link("audio/x-raw,channels=2");

        if let Some(encoder) = audio.encoder.as_deref() {
            line.link("audioconvert").link("queue").link(encoder);
        }
        line.link(format!("{}.", MUX_NAME));
    }
}
