use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

#[allow(deprecated)]
fn get_tvqa_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("tvqa")
}

fn tvqa() -> Command {
    let mut cmd = Command::new(get_tvqa_bin());
    cmd.env_remove("TVQA_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("tvqa.json");
    std::fs::write(
        &path,
        r#"{
            "platforms": [
                { "platform": "samsung", "base_url": "https://tv.example.com/samsung/" },
                { "platform": "philips", "base_url": "https://tv.example.com/philips/" }
            ],
            "resolutions": [ { "width": 1920, "height": 1080, "label": "1080p" } ]
        }"#,
    )
    .unwrap();
    path
}

#[test]
fn test_run_help_lists_flags() {
    tvqa()
        .arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run the regression checks"))
        .stdout(predicate::str::contains("--platforms"))
        .stdout(predicate::str::contains("--parallel"))
        .stdout(predicate::str::contains("--no-html"))
        .stdout(predicate::str::contains("--chrome-path"))
        .stdout(predicate::str::contains("samsung"));
}

#[test]
fn test_unknown_platform_is_rejected() {
    tvqa()
        .args(["run", "--platforms", "sony"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'sony'"));
}

#[test]
fn test_missing_config_fails_before_launch() {
    tvqa()
        .args(["run", "--config", "/nonexistent/tvqa.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_missing_chrome_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    tvqa()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--chrome-path")
        .arg("/nonexistent/chrome")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));
}

#[test]
fn test_unconfigured_platform_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    tvqa()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .args(["--platforms", "lg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Platform lg has no configured profile"));
}

#[test]
fn test_short_platform_flag() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    tvqa()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .args(["-p", "lg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Platform lg has no configured profile"));

    tvqa()
        .args(["run", "-p", "sony"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'sony'"));
}

#[test]
fn test_platforms_lists_configured_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    tvqa()
        .arg("platforms")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("samsung"))
        .stdout(predicate::str::contains("https://tv.example.com/philips/"))
        .stdout(predicate::str::contains("Tizen"))
        .stdout(predicate::str::contains("1080p (1920x1080)"));
}

#[test]
fn test_platforms_reads_local_config() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    tvqa()
        .current_dir(dir.path())
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("tvqa.json"));
}

#[test]
fn test_completion_help() {
    tvqa()
        .args(["completion", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("~/.bashrc"));
}

#[test]
fn test_completion_bash_generates_script() {
    tvqa()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_tvqa()"))
        .stdout(predicate::str::contains("complete -F _tvqa"));
}
