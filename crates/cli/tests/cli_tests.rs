// Copyright (C) 2023 Red Hat
// SPDX-License-Identifier: Apache-2.0

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const ILLEGAL: &str = "WARNING: An illegal reflective access operation has occurred";
const DENIED: &str = "WARNING: All illegal access operations will be denied in a future release";

fn warnjuicer(args: &[&Path], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_warnjuicer"))
        .args(args)
        .env_remove("WARNJUICER_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn warnjuicer");
    // The stdin is not read when only files are given.
    let _ = child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes());
    child.wait_with_output().expect("wait warnjuicer")
}

fn stdout(output: &Output) -> &str {
    std::str::from_utf8(&output.stdout).expect("utf8 output")
}

#[test]
fn it_reads_stdin() {
    let output = warnjuicer(&[], &format!("start\n{}\nend\n", ILLEGAL));
    assert!(output.status.success());
    assert_eq!(stdout(&output), "start\nWARN9\nend\n");
    assert!(output.stderr.is_empty());
}

#[test]
fn it_reads_files_in_order() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let a = dir.path().join("a.log");
    let b = dir.path().join("b.log");
    std::fs::write(&a, format!("a1\n{}\n", DENIED)).unwrap();
    std::fs::write(&b, format!("{}\r\nb2", ILLEGAL)).unwrap();

    let output = warnjuicer(&[a.as_path(), b.as_path()], "ignored\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "a1\nWARN12\nWARN9\nb2\n");

    let output = warnjuicer(&[b.as_path(), a.as_path()], "");
    assert_eq!(stdout(&output), "WARN9\nb2\na1\nWARN12\n");
}

#[test]
fn it_reads_dash_as_stdin() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let a = dir.path().join("a.log");
    std::fs::write(&a, "from file\n").unwrap();

    let output = warnjuicer(&[Path::new("-"), a.as_path()], &format!("{}\n", DENIED));
    assert!(output.status.success());
    assert_eq!(stdout(&output), "WARN12\nfrom file\n");
}

#[test]
fn it_fails_on_missing_file() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let a = dir.path().join("a.log");
    let missing = dir.path().join("missing.log");
    std::fs::write(&a, format!("{}\n", ILLEGAL)).unwrap();

    let output = warnjuicer(&[a.as_path(), missing.as_path()], "");
    assert!(!output.status.success());
    // The lines before the failure are written.
    assert_eq!(stdout(&output), "WARN9\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.log"), "stderr: {}", stderr);
}
