use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// Binary run from `dir` with its config directory pointed inside `dir`
fn mediaflow(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mediaflow").unwrap();
    cmd.current_dir(dir)
        .env("RUST_LOG", "off")
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}

#[test]
fn help_lists_workflows() {
    let dir = tempfile::tempdir().unwrap();

    mediaflow(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("audio"))
        .stdout(predicate::str::contains("video"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn audio_rejects_both_sources() {
    let dir = tempfile::tempdir().unwrap();

    mediaflow(dir.path())
        .args(["audio", "--youtube", "https://youtu.be/x", "--script", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn audio_requires_a_source() {
    let dir = tempfile::tempdir().unwrap();

    mediaflow(dir.path())
        .arg("audio")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--youtube").or(predicate::str::contains("--script")));
}

#[test]
fn video_rejects_missing_audio_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.mp3");

    mediaflow(dir.path())
        .args(["--quiet", "video", "--audio"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn config_show_prints_settings() {
    let dir = tempfile::tempdir().unwrap();

    mediaflow(dir.path())
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Service URL: http://localhost:3000"))
        .stdout(predicate::str::contains("Template: podcast"));
}

#[test]
fn config_init_replaces_broken_file_only_with_force() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.yaml");
    fs_err::write(&config, "service: [unclosed").unwrap();

    mediaflow(dir.path())
        .args(["config", "--show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));

    mediaflow(dir.path())
        .args(["config", "--init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs_err::read_to_string(&config).unwrap(), "service: [unclosed");

    mediaflow(dir.path())
        .args(["config", "--init", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    let written = fs_err::read_to_string(&config).unwrap();
    let parsed = mediaflow::Config::from_yaml(&written).unwrap();
    assert_eq!(parsed.service.base_url, "http://localhost:3000");

    mediaflow(dir.path())
        .args(["config", "--show"])
        .assert()
        .success();
}

#[test]
fn config_init_writes_to_user_config_dir() {
    let dir = tempfile::tempdir().unwrap();

    mediaflow(dir.path())
        .args(["config", "--init"])
        .assert()
        .success();

    // either the XDG location (Linux) or the platform config dir under HOME
    let found = walk(dir.path()).into_iter().any(|path| {
        path.ends_with(Path::new("mediaflow").join("config.yaml"))
    });
    assert!(found);
}

fn walk(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    for entry in fs_err::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(walk(&path));
        } else {
            files.push(path);
        }
    }
    files
}
