//! CLI integration tests

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with an isolated config home and no session type from the host
fn recorder_bin(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_desktop-recorder"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("XDG_SESSION_TYPE")
        .env_remove("RUST_LOG");
    cmd
}

/// Fake gst-launch that ignores its arguments and runs `body`
fn fake_tool(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-gst-launch");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    recorder_bin(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("devices"))
        .stdout(predicate::str::contains("--session-type"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    recorder_bin(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("desktop-recorder"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    recorder_bin(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("desktop-recorder/config.toml"));
}

#[test]
fn config_init_then_show() {
    let home = TempDir::new().unwrap();
    recorder_bin(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Config file created"));

    assert!(home
        .path()
        .join(".config/desktop-recorder/config.toml")
        .exists());

    recorder_bin(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output = \"stdout\""))
        .stdout(predicate::str::contains("format = \"matroska\""));
}

#[test]
fn args_dry_run_x11_stdout() {
    let home = TempDir::new().unwrap();
    let tool = fake_tool(home.path(), "exit 0");

    recorder_bin(home.path())
        .args(["--session-type", "x11", "args", "--tool"])
        .arg(&tool)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!("{} -qe ximagesrc", tool.display())))
        .stdout(predicate::str::contains("matroskamux name=mux streamable=true"))
        .stdout(predicate::str::contains("fdsink fd=1 sync=false"));
}

#[test]
fn args_dry_run_reads_session_type_from_env() {
    let home = TempDir::new().unwrap();
    let tool = fake_tool(home.path(), "exit 0");

    recorder_bin(home.path())
        .env("XDG_SESSION_TYPE", "wayland")
        .args(["args", "-o", "server", "--port", "9000", "--tool"])
        .arg(&tool)
        .assert()
        .success()
        .stdout(predicate::str::contains(" -e pipewiresrc do-timestamp=true"))
        .stdout(predicate::str::contains(
            "tcpserversink host=127.0.0.1 port=9000 sync=false",
        ));
}

#[test]
fn args_uses_config_file() {
    let home = TempDir::new().unwrap();
    let tool = fake_tool(home.path(), "exit 0");
    let out = TempDir::new().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(
        &config,
        format!(
            "tool_path = \"{}\"\nformat = \"mp4\"\n\n[file]\ndir = \"{}\"\n",
            tool.display(),
            out.path().display()
        ),
    )
    .unwrap();

    let expected = format!("location={}/take1.mp4", out.path().display());
    recorder_bin(home.path())
        .args(["--session-type", "x11", "--config"])
        .arg(&config)
        .args(["args", "-o", "file", "-n", "take1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "mp4mux name=mux streamable=false fragment-duration=1",
        ))
        .stdout(predicate::str::contains(expected));
}

#[test]
fn record_stdout_forwards_media() {
    let home = TempDir::new().unwrap();
    let tool = fake_tool(home.path(), "printf 'fake-media-stream'");

    recorder_bin(home.path())
        .args(["--session-type", "x11", "record", "--tool"])
        .arg(&tool)
        .assert()
        .success()
        .stdout("fake-media-stream");
}
