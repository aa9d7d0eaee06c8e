//! End-to-end runs of the `fanout` binary.

#![cfg(unix)]

use std::io::Write;
use std::process::Stdio;

use crate::common::{fanout_command, stderr_of, stdout_of, write_items};

#[test]
fn all_succeeded_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let items = write_items(dir.path(), &["a", "b", "c"]);

    let output = fanout_command(&dir.path().join("none.toml"))
        .arg("-i")
        .arg(&items)
        .args(["--", "test", "-n", "{}"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", stderr_of(&output));
    assert_eq!(
        stdout_of(&output),
        "3 items: 3 succeeded, 0 failed, 0 rejected, 0 skipped\n"
    );
}

#[test]
fn failures_exit_one_and_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let items = write_items(dir.path(), &["0", "2", "0"]);

    let output = fanout_command(&dir.path().join("none.toml"))
        .arg("--input")
        .arg(&items)
        .args(["--", "sh", "-c", "exit {}"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout_of(&output),
        "3 items: 2 succeeded, 1 failed, 0 rejected, 0 skipped\n\
         failed   [1] 2: exit code 2\n"
    );
}

#[test]
fn reads_items_from_stdin_and_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = fanout_command(&dir.path().join("none.toml"))
        .args(["--json", "-s", "skip", "--", "true"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"one\n\nskip-me\ntwo\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", stderr_of(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["total"], 3);
    assert_eq!(json["summary"]["skipped"], 1);
    assert_eq!(json["summary"]["successful"], 2);
}

#[test]
fn child_stdout_stays_off_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let items = write_items(dir.path(), &["hello"]);

    let output = fanout_command(&dir.path().join("none.toml"))
        .arg("-i")
        .arg(&items)
        .args(["--", "echo"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout_of(&output).contains("hello\n"));
    assert!(stderr_of(&output).contains("hello"));
}

#[test]
fn invalid_concurrency_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let items = write_items(dir.path(), &["a"]);

    let output = fanout_command(&dir.path().join("none.toml"))
        .arg("-i")
        .arg(&items)
        .args(["-j", "0", "--", "true"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).is_empty());
    assert!(stderr_of(&output).contains("max_concurrent"));
}

#[test]
fn missing_input_file_exits_two() {
    let dir = tempfile::tempdir().unwrap();

    let output = fanout_command(&dir.path().join("none.toml"))
        .arg("-i")
        .arg(dir.path().join("missing.txt"))
        .args(["--", "true"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("failed to open"));
}

#[test]
fn config_file_and_env_overrides_apply() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[run]\nonly_first_n = 2\n").unwrap();
    let items = write_items(dir.path(), &["a", "b", "c", "d"]);

    let from_file = fanout_command(&config)
        .arg("-i")
        .arg(&items)
        .args(["--", "true"])
        .output()
        .unwrap();
    assert!(stdout_of(&from_file).starts_with("2 items:"));

    let from_env = fanout_command(&config)
        .env(fanout_config::ONLY_FIRST_N_ENV, "3")
        .arg("-i")
        .arg(&items)
        .args(["--", "true"])
        .output()
        .unwrap();
    assert!(stdout_of(&from_env).starts_with("3 items:"));

    let bad_env = fanout_command(&config)
        .env(fanout_config::MAX_CONCURRENT_ENV, "lots")
        .arg("-i")
        .arg(&items)
        .args(["--", "true"])
        .output()
        .unwrap();
    assert_eq!(bad_env.status.code(), Some(2));
    assert!(stderr_of(&bad_env).contains(fanout_config::MAX_CONCURRENT_ENV));
}

#[cfg(target_os = "linux")]
#[test]
fn interrupt_kills_running_commands() {
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::common::running;

    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let script = format!(": {{}}; echo $$ > {}; exec sleep 30", pid_file.display());
    let items = write_items(dir.path(), &["a"]);

    let mut fanout = fanout_command(&dir.path().join("none.toml"))
        .arg("-i")
        .arg(&items)
        .args(["--shell", "sh", "--", &script])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    let command_pid = loop {
        if let Some(pid) = std::fs::read_to_string(&pid_file)
            .ok()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
        {
            break pid;
        }
        assert!(Instant::now() < deadline, "command never started");
        thread::sleep(Duration::from_millis(20));
    };
    assert!(running(command_pid));

    unsafe {
        libc::kill(fanout.id() as libc::pid_t, libc::SIGINT);
    }
    let output = fanout.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(130), "{}", stderr_of(&output));
    assert!(stdout_of(&output).is_empty());

    let deadline = Instant::now() + Duration::from_secs(5);
    while running(command_pid) {
        assert!(
            Instant::now() < deadline,
            "command {command_pid} outlived fanout"
        );
        thread::sleep(Duration::from_millis(20));
    }
}
