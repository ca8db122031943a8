//! The `cookiescope` executable: exit status and fatal-error behavior.

use std::fs;
use std::process::{Command, Output};

use tempfile::tempdir;

use crate::common::{parse_report, write_file};

fn cookiescope(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cookiescope"))
        .args(args)
        .env("RUST_LOG", "info")
        .env_remove("BROWSER_PATH")
        .output()
        .expect("failed to spawn cookiescope")
}

#[test]
fn help_lists_the_options() {
    let output = cookiescope(&["--help"]);
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--sites",
        "--output",
        "--delay",
        "--timeout",
        "--headful",
        "--no-verify",
        "--separator",
        "--workers",
    ] {
        assert!(help.contains(flag), "missing {flag} in help");
    }
}

#[test]
fn missing_site_list_is_fatal_and_writes_no_report() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.toml", "");
    let report = dir.path().join("report.csv");

    let output = cookiescope(&[
        "--config",
        config.to_str().unwrap(),
        "--sites",
        dir.path().join("nope.txt").to_str().unwrap(),
        "--output",
        report.to_str().unwrap(),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read site list"));
    assert!(!report.exists());
}

#[test]
fn invalid_config_is_fatal() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.toml", "[audit]\nworkers = \"many\"\n");
    let output = cookiescope(&["--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to load config"));
}

#[test]
fn empty_site_list_writes_header_only_report() {
    let dir = tempdir().unwrap();
    let config = write_file(dir.path(), "config.toml", "");
    let sites = write_file(dir.path(), "sites.txt", "# nothing yet\n\n");
    let report = dir.path().join("report.csv");

    let output = cookiescope(&[
        "--config",
        config.to_str().unwrap(),
        "--sites",
        sites.to_str().unwrap(),
        "--output",
        report.to_str().unwrap(),
        "--no-color",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Starting cookie audit for 0 site(s)"));
    assert!(stdout.contains("Scan complete"));
    assert!(parse_report(&fs::read(&report).unwrap()).is_empty());
}
