//! Output sink and container format selections

use std::fmt;
use std::str::FromStr;

use crate::domain::error::CompileError;

/// Where the encoded stream goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Stdout,
    Server,
    File,
    Hls,
}

impl OutputKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Server => "server",
            Self::File => "file",
            Self::Hls => "hls",
        }
    }

    /// Whether the output is written into `file.dir`
    pub const fn writes_to_dir(&self) -> bool {
        matches!(self, Self::File | Self::Hls)
    }
}

impl FromStr for OutputKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(Self::Stdout),
            "server" => Ok(Self::Server),
            "file" => Ok(Self::File),
            "hls" | "m3u" | "m3u8" => Ok(Self::Hls),
            _ => Err(CompileError::UnsupportedOption {
                field: "output",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Container format, one muxer element and one file extension each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    Matroska,
    Mp4,
    MpegTs,
}

impl ContainerFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Matroska => "matroska",
            Self::Mp4 => "mp4",
            Self::MpegTs => "mpegts",
        }
    }

    /// Muxer element name
    pub const fn muxer(&self) -> &'static str {
        match self {
            Self::Matroska => "matroskamux",
            Self::Mp4 => "mp4mux",
            Self::MpegTs => "mpegtsmux",
        }
    }

    /// File extension including the leading dot
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Matroska => ".mkv",
            Self::Mp4 => ".mp4",
            Self::MpegTs => ".ts",
        }
    }
}

impl FromStr for ContainerFormat {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matroska" | "mkv" => Ok(Self::Matroska),
            "mp4" => Ok(Self::Mp4),
            "mpegts" | "ts" => Ok(Self::MpegTs),
            _ => Err(CompileError::UnsupportedOption {
                field: "format",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
