//! Command runners

use std::path::PathBuf;
use std::process::ExitCode;

use tokio::io::{self, AsyncWriteExt};
use tracing::{debug, warn};

use crate::application::list_audio_devices;
use crate::application::ports::{ConfigStore, RecorderError, Recording, ScreenRecorder};
use crate::application::AudioDevices;
use crate::domain::capture::SessionType;
use crate::domain::config::{OutputKind, PartialRecorderConfig};
use crate::domain::error::ConfigError;
use crate::infrastructure::{GstRecorder, PacmdDeviceLister, XdgConfigStore};

use super::args::RecordArgs;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub session_type: Option<String>,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    /// Config store at `--config` or the XDG default
    pub fn config_store(&self) -> XdgConfigStore {
        match &self.config {
            Some(path) => XdgConfigStore::with_path(path),
            None => XdgConfigStore::new(),
        }
    }
}

/// Exit code for a recorder failure
pub fn exit_code_for(error: &RecorderError) -> u8 {
    match error {
        RecorderError::Compile(_) => EXIT_USAGE_ERROR,
        _ => EXIT_ERROR,
    }
}

/// Load and merge configuration: file < CLI flags.
/// Defaults are applied by the recorder on every compile.
pub async fn load_merged_config<S: ConfigStore>(
    store: &S,
    cli_config: PartialRecorderConfig,
) -> Result<PartialRecorderConfig, ConfigError> {
    let file_config = store.load().await?;
    Ok(file_config.layer(cli_config))
}

/// Build a recorder from the global options and record flags
pub async fn build_recorder(
    globals: &GlobalOptions,
    args: &RecordArgs,
) -> Result<GstRecorder, ConfigError> {
    let session_type = SessionType::from_value(globals.session_type.as_deref())?;
    let options =
        load_merged_config(&globals.config_store(), args.to_partial(globals.verbose)).await?;
    debug!(?session_type, "Building recorder");
    Ok(GstRecorder::new(options, session_type))
}

/// Print the compiled launcher arguments without spawning anything
pub async fn run_args(globals: GlobalOptions, args: RecordArgs) -> ExitCode {
    let presenter = Presenter::new();

    let recorder = match build_recorder(&globals, &args).await {
        Ok(recorder) => recorder,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    match recorder.compile() {
        Ok(pipeline) => {
            let tool = recorder.effective_config().tool_path;
            presenter.command_line(&tool.to_string_lossy(), &pipeline.args);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_USAGE_ERROR)
        }
    }
}

/// List audio sources
pub fn run_devices(keyed: bool, json: bool) -> ExitCode {
    let presenter = Presenter::new();
    let devices = list_audio_devices(&PacmdDeviceLister::new(), !keyed);

    if json {
        return match serde_json::to_string_pretty(&devices) {
            Ok(text) => {
                presenter.output(&text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                presenter.error(&format!("Failed to encode device list: {}", e));
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    if devices.is_empty() {
        presenter.warn("No audio sources found");
    }
    match &devices {
        AudioDevices::Ordered(names) => names.iter().for_each(|name| presenter.output(name)),
        AudioDevices::Indexed(entries) => entries
            .iter()
            .for_each(|(key, name)| presenter.key_value(key, name)),
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Record until interrupted
pub async fn run_record(globals: GlobalOptions, args: RecordArgs) -> ExitCode {
    let mut presenter = Presenter::new();

    let recorder = match build_recorder(&globals, &args).await {
        Ok(recorder) => recorder,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE_ERROR);
        }
    };

    let mut shutdown = match ShutdownSignal::setup() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let recording = match recorder.start().await {
        Ok(recording) => recording,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(exit_code_for(&e));
        }
    };

    let code = match recording {
        Recording::Stream(mut media) => {
            let mut stdout = io::stdout();
            let copied = {
                let copy = io::copy(&mut media, &mut stdout);
                tokio::pin!(copy);

                tokio::select! {
                    result = &mut copy => result,
                    signal = shutdown.recv() => {
                        debug!(%signal, "Stopping stream");
                        stop_quietly(&recorder).await;
                        // keep forwarding until the muxer closes the stream
                        (&mut copy).await
                    }
                }
            };
            let flushed = stdout.flush().await;

            match forwarded(copied, flushed) {
                Ok(bytes) => {
                    debug!(bytes, "Stream closed");
                    EXIT_SUCCESS
                }
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    stop_quietly(&recorder).await;
                    EXIT_SUCCESS
                }
                Err(e) => {
                    presenter.error(&format!("Failed to forward stream: {}", e));
                    stop_quietly(&recorder).await;
                    EXIT_ERROR
                }
            }
        }
        Recording::Launching(handle) => {
            presenter.start_spinner("Launching pipeline...");

            let interrupted = tokio::select! {
                launched = handle.launched() => match launched {
                    Ok(()) => false,
                    Err(e) => {
                        presenter.spinner_fail(&e.to_string());
                        recorder.wait_until_idle().await;
                        return ExitCode::from(exit_code_for(&e));
                    }
                },
                _ = shutdown.recv() => true,
            };

            if interrupted {
                presenter.spinner_fail("Interrupted before the pipeline started");
                stop_quietly(&recorder).await;
                recorder.wait_until_idle().await;
                return ExitCode::from(EXIT_SUCCESS);
            }

            presenter.spinner_success(&describe_target(&recorder));
            presenter.info("Press Ctrl+C to stop");

            let exited_early = tokio::select! {
                _ = shutdown.recv() => false,
                _ = recorder.wait_until_idle() => true,
            };

            if exited_early {
                presenter.error("Pipeline exited unexpectedly");
                EXIT_ERROR
            } else {
                presenter.start_spinner("Finalizing recording...");
                stop_quietly(&recorder).await;
                recorder.wait_until_idle().await;
                presenter.spinner_success("Recording stopped");
                EXIT_SUCCESS
            }
        }
    };

    ExitCode::from(code)
}

/// Stop the recorder, tolerating a process that already exited
async fn stop_quietly<R: ScreenRecorder>(recorder: &R) {
    if let Err(e) = recorder.stop().await {
        warn!("Stop failed: {}", e);
    }
}

/// Bytes forwarded to stdout, or the first error of the copy and final flush
fn forwarded(copied: std::io::Result<u64>, flushed: std::io::Result<()>) -> std::io::Result<u64> {
    let bytes = copied?;
    flushed?;
    Ok(bytes)
}

fn describe_target(recorder: &GstRecorder) -> String {
    let config = recorder.effective_config();
    match (config.output.parse::<OutputKind>(), recorder.output_path()) {
        (Ok(OutputKind::Server), _) => format!(
            "Serving on tcp://{}:{}",
            config.server.host, config.server.port
        ),
        (Ok(OutputKind::Hls), Ok(Some(dir))) => {
            format!("Writing HLS playlist to {}", dir.display())
        }
        (_, Ok(Some(path))) => format!("Recording to {}", path.display()),
        _ => format!("Recording ({})", config.output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::PartialFileConfig;
    use crate::domain::error::CompileError;
    use tempfile::TempDir;

    #[test]
    fn compile_errors_are_usage_errors() {
        let err = RecorderError::Compile(CompileError::UnsupportedOption {
            field: "format",
            value: "avi".to_string(),
        });
        assert_eq!(exit_code_for(&err), EXIT_USAGE_ERROR);
        assert_eq!(exit_code_for(&RecorderError::LaunchTimeout), EXIT_ERROR);
        assert_eq!(
            exit_code_for(&RecorderError::SpawnFailure("x".to_string())),
            EXIT_ERROR
        );
    }

    #[test]
    fn flush_errors_fail_the_stream() {
        use std::io::{Error, ErrorKind};

        assert_eq!(forwarded(Ok(42), Ok(())).unwrap(), 42);

        let err = forwarded(Ok(42), Err(Error::new(ErrorKind::Other, "disk full"))).unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        let err = forwarded(
            Err(Error::from(ErrorKind::BrokenPipe)),
            Err(Error::new(ErrorKind::Other, "disk full")),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn cli_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "output = \"file\"\nformat = \"mp4\"\n[file]\ndir = \"/srv\"\n")
            .unwrap();
        let store = XdgConfigStore::with_path(&path);

        let cli = PartialRecorderConfig {
            format: Some("mpegts".to_string()),
            file: Some(PartialFileConfig {
                name: Some(Some("take1".to_string())),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = load_merged_config(&store, cli).await.unwrap();

        assert_eq!(merged.output.as_deref(), Some("file"));
        assert_eq!(merged.format.as_deref(), Some("mpegts"));
        let file = merged.file.unwrap();
        assert_eq!(file.dir, Some(PathBuf::from("/srv")));
        assert_eq!(file.name.flatten().as_deref(), Some("take1"));
    }

    #[tokio::test]
    async fn missing_session_type_is_config_error() {
        let globals = GlobalOptions {
            session_type: None,
            ..Default::default()
        };
        let result = build_recorder(&globals, &RecordArgs::default()).await;
        assert!(matches!(result, Err(ConfigError::MissingSessionType)));
    }

    #[tokio::test]
    async fn session_type_selects_backend() {
        let dir = TempDir::new().unwrap();
        let globals = GlobalOptions {
            session_type: Some("wayland".to_string()),
            config: Some(dir.path().join("absent.toml")),
            ..Default::default()
        };
        let recorder = build_recorder(&globals, &RecordArgs::default())
            .await
            .unwrap();
        assert_eq!(recorder.session_type(), SessionType::Compositor);
    }
}
