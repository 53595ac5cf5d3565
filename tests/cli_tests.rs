//! Tests that drive the built binary

#![cfg(unix)]

use std::process::Command;

fn runner() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rpm-acceptance"))
}

#[test]
fn test_json_stdout_is_not_mixed_with_child_output() {
    let output = runner()
        .args([
            "upgrade",
            "--format",
            "json",
            "--upgrade-command",
            "echo",
            "hello-from-yum",
            "{package}",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["passed"], 1);
    assert_eq!(value["cases"][0]["id"], "CXP9031109-1");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hello-from-yum ERIClitpcli"));
}

#[test]
fn test_quoted_command_argument_reaches_child_intact() {
    let output = runner()
        .args([
            "upgrade",
            "--format",
            "json",
            "--upgrade-command",
            "sh",
            "-c",
            "test \"$1\" = 'two words'",
            "sh",
            "two words",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["cases"][0]["outcome"]["status"], "pass");
}
