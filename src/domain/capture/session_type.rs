//! Display session type value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::ConfigError;

/// Display server the recording runs under. Selects the video source element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionType {
    /// Classic X11 session, captured with `ximagesrc`
    X11,
    /// Compositor session (Wayland etc.), captured through PipeWire
    Compositor,
}

impl SessionType {
    /// Parse an optional session value, failing fast when it is absent.
    pub fn from_value(value: Option<&str>) -> Result<Self, ConfigError> {
        match value {
            Some(v) => v.parse(),
            None => Err(ConfigError::MissingSessionType),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::X11 => "x11",
            Self::Compositor => "compositor",
        }
    }

    /// Video source element and its flags
    pub fn video_source(&self, pipewire_path: Option<&str>) -> Vec<String> {
        match self {
            Self::X11 => vec![
                "ximagesrc".to_string(),
                "use-damage=false".to_string(),
                "do-timestamp=true".to_string(),
            ],
            Self::Compositor => {
                let mut tokens = vec!["pipewiresrc".to_string()];
                if let Some(path) = pipewire_path {
                    tokens.push(format!("path={}", path));
                }
                tokens.push("do-timestamp=true".to_string());
                tokens
            }
        }
    }
}

impl FromStr for SessionType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "" => Err(ConfigError::MissingSessionType),
            "x11" => Ok(Self::X11),
            _ => Ok(Self::Compositor),
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x11_is_case_insensitive() {
        assert_eq!("X11".parse::<SessionType>().unwrap(), SessionType::X11);
        assert_eq!(" x11 ".parse::<SessionType>().unwrap(), SessionType::X11);
    }

    #[test]
    fn anything_else_is_compositor() {
        assert_eq!("wayland".parse::<SessionType>().unwrap(), SessionType::Compositor);
        assert_eq!("tty".parse::<SessionType>().unwrap(), SessionType::Compositor);
    }

    #[test]
    fn missing_value_fails_fast() {
        assert!(matches!(
            SessionType::from_value(None),
            Err(ConfigError::MissingSessionType)
        ));
        assert!(matches!(
            SessionType::from_value(Some("  ")),
            Err(ConfigError::MissingSessionType)
        ));
    }

    #[test]
    fn pipewire_source_omits_default_path() {
        let tokens = SessionType::Compositor.video_source(None);
        assert_eq!(tokens, vec!["pipewiresrc", "do-timestamp=true"]);

        let tokens = SessionType::Compositor.video_source(Some("42"));
        assert_eq!(tokens, vec!["pipewiresrc", "path=42", "do-timestamp=true"]);
    }

    #[test]
    fn x11_source_ignores_pipewire_path() {
        let tokens = SessionType::X11.video_source(Some("42"));
        assert_eq!(tokens, vec!["ximagesrc", "use-damage=false", "do-timestamp=true"]);
    }
}
