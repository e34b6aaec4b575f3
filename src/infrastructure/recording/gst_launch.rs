//! gst-launch based screen recorder adapter

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::application::launch::{
    drain_output, launch_timer, LaunchSignal, LaunchToken, LAUNCH_QUIET_PERIOD,
};
use crate::application::ports::{
    Clock, DeviceLister, LaunchHandle, RecorderError, Recording, ScreenRecorder,
};
use crate::application::{list_audio_devices, AudioDevices};
use crate::domain::capture::SessionType;
use crate::domain::config::{resolve_options, PartialRecorderConfig, RecorderConfig};
use crate::domain::error::CompileError;
use crate::domain::pipeline::{CompiledPipeline, PipelineCompiler};
use crate::domain::recording::{ProcessSession, RecorderState, SessionFileName};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::devices::PacmdDeviceLister;

/// State shared with the process observer tasks
struct Shared {
    /// Owned process; only the exit observer moves it back to idle
    session: watch::Sender<ProcessSession>,
    /// Pending launch timer and the generation it belongs to
    launch: Mutex<Option<(u64, LaunchToken)>>,
}

impl Shared {
    /// Drop the launch token of `generation`, cancelling it if still pending.
    fn cancel_launch(&self, generation: Option<u64>) {
        let mut guard = self.launch.lock().unwrap_or_else(|e| e.into_inner());
        let matches = match (guard.as_ref(), generation) {
            (Some((owner, _)), Some(g)) => *owner == g,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if matches {
            if let Some((_, mut token)) = guard.take() {
                token.cancel();
            }
        }
    }
}

/// Screen recorder driving an external gst-launch process
pub struct GstRecorder<D: DeviceLister = PacmdDeviceLister> {
    /// User options, layered over the defaults on every start
    options: PartialRecorderConfig,
    compiler: PipelineCompiler,
    devices: D,
    clock: Arc<dyn Clock>,
    file_name: Mutex<SessionFileName>,
    shared: Arc<Shared>,
}

impl GstRecorder<PacmdDeviceLister> {
    /// Create a recorder for the given session type.
    /// The capture source it selects is fixed for the recorder's lifetime.
    pub fn new(options: PartialRecorderConfig, session_type: SessionType) -> Self {
        Self {
            options,
            compiler: PipelineCompiler::new(session_type),
            devices: PacmdDeviceLister::new(),
            clock: Arc::new(SystemClock),
            file_name: Mutex::new(SessionFileName::new()),
            shared: Arc::new(Shared {
                session: watch::Sender::new(ProcessSession::new()),
                launch: Mutex::new(None),
            }),
        }
    }
}

impl<D: DeviceLister> GstRecorder<D> {
    /// Use another device lister
    pub fn with_device_lister<L: DeviceLister>(self, devices: L) -> GstRecorder<L> {
        GstRecorder {
            options: self.options,
            compiler: self.compiler,
            devices,
            clock: self.clock,
            file_name: self.file_name,
            shared: self.shared,
        }
    }

    /// Use another clock for generated file names
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn session_type(&self) -> SessionType {
        self.compiler.session_type()
    }

    /// Effective configuration: `target` (defaults when `None`) with
    /// `source` (this recorder's options when `None`) layered on top.
    pub fn options(
        &self,
        target: Option<&RecorderConfig>,
        source: Option<&PartialRecorderConfig>,
    ) -> RecorderConfig {
        let home = dirs::home_dir();
        resolve_options(target, source.unwrap_or(&self.options), home.as_deref())
    }

    /// Effective configuration of this recorder
    pub fn effective_config(&self) -> RecorderConfig {
        self.options(None, None)
    }

    /// Compile the effective configuration.
    /// A generated file name is resolved once per session and reused on later
    /// compiles until the next `start`.
    pub fn compile(&self) -> Result<CompiledPipeline, CompileError> {
        let config = self.effective_config();
        let name = self
            .file_name
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .resolve(config.file.name.as_deref(), || self.clock.now());
        self.compiler.compile(&config, &name)
    }

    /// List audio capture sources; empty when the query fails.
    pub fn audio_devices(&self, as_array: bool) -> AudioDevices {
        list_audio_devices(&self.devices, as_array)
    }

    /// Pid of the owned process
    pub fn pid(&self) -> Option<u32> {
        self.shared.session.borrow().pid()
    }

    /// Recording file of the current session, if the output writes one
    pub fn output_path(&self) -> Result<Option<PathBuf>, CompileError> {
        Ok(self.compile()?.location)
    }

    fn spawn(pipeline: &CompiledPipeline, program: &Path) -> Result<Child, RecorderError> {
        let mut command = Command::new(program);
        command
            .args(&pipeline.args)
            .stdin(pipeline.streams.stdin.to_stdio())
            .stdout(pipeline.streams.stdout.to_stdio())
            .stderr(pipeline.streams.stderr.to_stdio())
            .process_group(0);

        command.spawn().map_err(|e| {
            error!("Failed to spawn {}: {}", program.display(), e);
            RecorderError::SpawnFailure(e.to_string())
        })
    }

    /// Release the session once the process exits
    fn observe_exit(&self, mut child: Child, generation: u64) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => info!(%status, "Pipeline process exited"),
                Err(e) => error!("Failed to wait for pipeline process: {}", e),
            }
            shared.session.send_if_modified(|s| s.exited(generation));
        });
    }

    /// Resolve the launch handle once stdout has been quiet long enough
    fn detect_launch(&self, mut stdout: ChildStdout, generation: u64) -> LaunchHandle {
        let (token, timer) = launch_timer(LAUNCH_QUIET_PERIOD);
        *self.shared.launch.lock().unwrap_or_else(|e| e.into_inner()) = Some((generation, token));

        let (tx, rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = match timer.wait(&mut stdout).await {
                LaunchSignal::Quiet => {
                    shared.cancel_launch(Some(generation));
                    if shared.session.send_if_modified(|s| s.launched(generation).is_ok()) {
                        info!("Pipeline launched");
                        Ok(())
                    } else {
                        warn!("Pipeline exited before it launched");
                        Err(RecorderError::LaunchTimeout)
                    }
                }
                LaunchSignal::Cancelled => Err(RecorderError::LaunchCancelled),
            };
            let _ = tx.send(result);
            drain_output(stdout).await;
        });

        LaunchHandle::new(rx)
    }
}

/// Send signal to the pipeline process
fn send_signal(pid: u32, sig: Signal) -> Result<(), RecorderError> {
    signal::kill(Pid::from_raw(pid as i32), sig)
        .map_err(|e| RecorderError::SignalFailure(format!("{} to pid {}: {}", sig, pid, e)))
}

#[async_trait]
impl<D: DeviceLister> ScreenRecorder for GstRecorder<D> {
    async fn start(&self) -> Result<Recording, RecorderError> {
        let busy = !self.shared.session.borrow().is_idle();
        if busy {
            if let Err(e) = self.stop().await {
                warn!("Failed to stop previous recording: {}", e);
            }
        }
        self.file_name
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .reset();

        let config = self.effective_config();
        let pipeline = self.compile()?;
        debug!(args = ?pipeline.args, "Compiled pipeline");

        let mut child = Self::spawn(&pipeline, &config.tool_path)?;
        let pid = child.id().ok_or_else(|| {
            RecorderError::SpawnFailure("process exited before it was tracked".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            RecorderError::SpawnFailure("pipeline stdout was not captured".to_string())
        })?;

        let detect = !pipeline.streams_to_stdout();
        let mut generation = 0;
        self.shared
            .session
            .send_modify(|s| generation = s.spawned(pid, detect));
        info!(pid, output = %pipeline.output, "Started {}", config.tool_path.display());

        self.observe_exit(child, generation);

        if detect {
            Ok(Recording::Launching(self.detect_launch(stdout, generation)))
        } else {
            Ok(Recording::Stream(stdout))
        }
    }

    async fn stop(&self) -> Result<(), RecorderError> {
        let owned = self.shared.session.borrow().pid();
        let Some(pid) = owned else {
            return Err(RecorderError::SignalFailure(
                "no recording process is running".to_string(),
            ));
        };

        self.shared.cancel_launch(None);

        // SIGINT makes gst-launch -e send EOS so the muxer finalizes the file
        send_signal(pid, Signal::SIGINT)?;
        info!(pid, "Sent SIGINT to pipeline");
        Ok(())
    }

    fn state(&self) -> RecorderState {
        self.shared.session.borrow().state()
    }

    async fn wait_until_idle(&self) {
        let mut rx = self.shared.session.subscribe();
        let _ = rx.wait_for(|s| s.is_idle()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::time::timeout;

    use crate::application::ports::DeviceQueryError;
    use crate::domain::config::{PartialFileConfig, PartialRecorderConfig};
    use crate::domain::error::CompileError;

    struct FixedClock(NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    struct FixedLister;

    impl DeviceLister for FixedLister {
        fn list_sources(&self) -> Result<String, DeviceQueryError> {
            Ok("... name: <A>\n... name: <B>\n".to_string())
        }
    }

    /// Fake launcher script that ignores its arguments
    fn fake_tool(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("gst-launch-1.0");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn recorder(dir: &TempDir, output: &str, body: &str) -> GstRecorder {
        let options = PartialRecorderConfig {
            tool_path: Some(fake_tool(dir, body)),
            output: Some(output.to_string()),
            file: Some(PartialFileConfig {
                dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            }),
            ..Default::default()
        };
        GstRecorder::new(options, SessionType::X11)
    }

    async fn idle(recorder: &GstRecorder) {
        timeout(Duration::from_secs(10), recorder.wait_until_idle())
            .await
            .expect("process did not exit");
    }

    #[tokio::test]
    async fn stdout_output_returns_stream() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "stdout", "printf 'media-bytes'");

        let recording = recorder.start().await.unwrap();
        let Recording::Stream(mut stdout) = recording else {
            panic!("expected a stream");
        };

        let mut bytes = Vec::new();
        stdout.read_to_end(&mut bytes).await.unwrap();
        assert_eq!(bytes, b"media-bytes");
        idle(&recorder).await;
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn stdout_output_is_running_immediately() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "stdout", "exec sleep 30");

        let _stream = recorder.start().await.unwrap();
        assert_eq!(recorder.state(), RecorderState::Running);
        assert!(recorder.pid().is_some());

        recorder.stop().await.unwrap();
        idle(&recorder).await;
        assert!(recorder.pid().is_none());
    }

    #[tokio::test]
    async fn file_output_launches_after_quiet_period() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "file", "echo 'Setting pipeline to PLAYING ...'\nexec sleep 30");

        let Recording::Launching(handle) = recorder.start().await.unwrap() else {
            panic!("expected launch detection");
        };
        assert_eq!(recorder.state(), RecorderState::Launching);

        handle.launched().await.unwrap();
        assert_eq!(recorder.state(), RecorderState::Running);

        recorder.stop().await.unwrap();
        idle(&recorder).await;
    }

    #[tokio::test]
    async fn exit_during_quiet_period_is_launch_timeout() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "server", "echo 'ERROR: no element'\nexit 1");

        let Recording::Launching(handle) = recorder.start().await.unwrap() else {
            panic!("expected launch detection");
        };
        assert!(matches!(
            handle.launched().await,
            Err(RecorderError::LaunchTimeout)
        ));
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[tokio::test]
    async fn stop_while_launching_cancels_launch() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "file", "exec sleep 30");

        let Recording::Launching(handle) = recorder.start().await.unwrap() else {
            panic!("expected launch detection");
        };
        recorder.stop().await.unwrap();

        assert!(matches!(
            handle.launched().await,
            Err(RecorderError::LaunchCancelled)
        ));
        idle(&recorder).await;
    }

    #[tokio::test]
    async fn restart_stops_previous_process() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "stdout", "exec sleep 30");

        let _first = recorder.start().await.unwrap();
        let first_pid = recorder.pid().unwrap();

        let _second = recorder.start().await.unwrap();
        let second_pid = recorder.pid().unwrap();
        assert_ne!(first_pid, second_pid);

        // the first process exits without releasing the second one
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(recorder.pid(), Some(second_pid));
        assert_eq!(recorder.state(), RecorderState::Running);

        recorder.stop().await.unwrap();
        idle(&recorder).await;
    }

    #[tokio::test]
    async fn stop_without_process_is_signal_failure() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "stdout", "exit 0");

        assert!(matches!(
            recorder.stop().await,
            Err(RecorderError::SignalFailure(_))
        ));
    }

    #[tokio::test]
    async fn configuration_errors_spawn_nothing() {
        let dir = TempDir::new().unwrap();
        let mut options = PartialRecorderConfig {
            tool_path: Some(dir.path().join("missing")),
            ..Default::default()
        };
        let recorder = GstRecorder::new(options.clone(), SessionType::X11);
        assert!(matches!(
            recorder.start().await,
            Err(RecorderError::Compile(CompileError::PathNotFound { .. }))
        ));
        assert_eq!(recorder.state(), RecorderState::Idle);

        options.tool_path = Some(fake_tool(&dir, "exit 0"));
        options.format = Some("avi".to_string());
        let recorder = GstRecorder::new(options, SessionType::X11);
        assert!(matches!(
            recorder.start().await,
            Err(RecorderError::Compile(CompileError::UnsupportedOption { .. }))
        ));
        assert!(recorder.pid().is_none());
    }

    #[test]
    fn generated_name_is_stable_per_recorder() {
        let dir = TempDir::new().unwrap();
        let at = |s| {
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, s)
                .unwrap()
        };

        let first = recorder(&dir, "file", "exit 0").with_clock(Arc::new(FixedClock(at(1))));
        let path = first.output_path().unwrap().unwrap();
        assert_eq!(path, dir.path().join("desktop_2024-05-01_12:00:01.mkv"));
        let first = first.with_clock(Arc::new(FixedClock(at(9))));
        assert_eq!(first.output_path().unwrap().unwrap(), path);

        let second = recorder(&dir, "file", "exit 0").with_clock(Arc::new(FixedClock(at(9))));
        assert_ne!(second.output_path().unwrap().unwrap(), path);
    }

    /// Clock that moves forward five seconds on every read
    struct SteppingClock(Mutex<NaiveDateTime>);

    impl Clock for SteppingClock {
        fn now(&self) -> NaiveDateTime {
            let mut now = self.0.lock().unwrap();
            let current = *now;
            *now += chrono::Duration::seconds(5);
            current
        }
    }

    #[tokio::test]
    async fn restart_generates_new_file_name() {
        let dir = TempDir::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let recorder = recorder(&dir, "file", "exec sleep 30")
            .with_clock(Arc::new(SteppingClock(Mutex::new(start))));

        let _first = recorder.start().await.unwrap();
        let first = recorder.output_path().unwrap().unwrap();
        assert_eq!(recorder.output_path().unwrap().unwrap(), first);

        let _second = recorder.start().await.unwrap();
        let second = recorder.output_path().unwrap().unwrap();
        assert_ne!(first, second);
        assert_eq!(recorder.output_path().unwrap().unwrap(), second);

        recorder.stop().await.unwrap();
        idle(&recorder).await;
    }

    #[test]
    fn options_override_layers() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "file", "exit 0");

        let effective = recorder.effective_config();
        assert_eq!(effective.output, "file");
        assert_eq!(effective.file.dir, dir.path());

        let mut target = RecorderConfig::defaults();
        target.preset = "medium".to_string();
        let source = PartialRecorderConfig {
            output: Some("server".to_string()),
            ..Default::default()
        };
        let custom = recorder.options(Some(&target), Some(&source));
        assert_eq!(custom.preset, "medium");
        assert_eq!(custom.output, "server");
    }

    #[test]
    fn audio_devices_from_lister() {
        let dir = TempDir::new().unwrap();
        let recorder = recorder(&dir, "stdout", "exit 0").with_device_lister(FixedLister);

        assert_eq!(
            recorder.audio_devices(true),
            AudioDevices::Ordered(vec!["A".to_string(), "B".to_string()])
        );
        let keyed = recorder.audio_devices(false);
        assert_eq!(keyed.get("dev0"), Some("A"));
        assert_eq!(keyed.get("dev1"), Some("B"));
    }
}
