//! Command-line behaviour of the binary.

use std::fs;
use std::process::Command;

use tempfile::tempdir;

mod common;

#[tokio::test]
async fn test_report_stdout_is_clean_json_with_debug_logging() {
    let (addr, _log) = common::start_programmable_backend(|| async { (200, "ok".into()) }).await;

    let tmp = tempdir().unwrap();
    let config_path = tmp.path().join("monitor.toml");
    fs::write(
        &config_path,
        format!(
            r#"
            [probe]
            url = "http://{}/"
            require_active_interface = false
            use_system_proxy = false

            [observability]
            log_level = "debug"
            "#,
            addr
        ),
    )
    .unwrap();

    let output = tokio::task::spawn_blocking(move || {
        Command::new(env!("CARGO_BIN_EXE_connectivity-monitor"))
            .arg("--config")
            .arg(&config_path)
            .arg("probe")
            .env("RUST_LOG", "debug")
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["connected"], serde_json::Value::Bool(true));
    assert_eq!(report["url"], format!("http://{}/", addr));
    assert!(!output.stderr.is_empty(), "logs should go to stderr");
}
