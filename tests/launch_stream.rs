//! End-to-end launch tests against real child processes
//!
//! These exercise the full path: fake download tools written as shell
//! scripts, launched with argument vectors from [`DownloadRequest`], output
//! streamed through sinks and routed over the broadcast channel.

#![cfg(unix)]
// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use ytdl_bridge::{
    BroadcastSink, DownloadRequest, Event, JobId, LaunchConfig, ProcessLauncher, ProcessRequest,
};

/// Write an executable shell script into `dir` and return its path
fn fake_tool(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn arguments_reach_the_tool_verbatim() {
    let dir = TempDir::new().unwrap();
    // Echo every argument on its own line, exactly as received
    let tool = fake_tool(&dir, "argdump", r#"printf '%s\n' "$@""#);

    let launcher = ProcessLauncher::default();
    let request = ProcessRequest::new(&tool).args(["a b", "$HOME", "; echo injected"]);

    let result = launcher
        .launch(request, None, &CancellationToken::new())
        .await
        .unwrap();

    // No shell ever saw these: spacing, variables, and separators survive
    assert_eq!(result.output, "a b\n$HOME\n; echo injected\n");
    assert!(result.success());
}

#[tokio::test]
async fn download_request_drives_a_tool_end_to_end() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(&dir, "ytdl-stub", r#"printf '%s\n' "$@""#);

    let request =
        DownloadRequest::playlist_video("https://example.com/playlist?list=x", "1-3", None)
            .unwrap();

    let launcher = ProcessLauncher::default();
    let result = launcher
        .launch(
            ProcessRequest::new(&tool).args(request.args()),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let lines: Vec<&str> = result.output.lines().collect();
    assert_eq!(lines, request.args().iter().map(String::as_str).collect::<Vec<_>>());
    assert!(result.success());
}

#[tokio::test]
async fn stdin_payload_feeds_the_tool_before_reading() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(&dir, "reader", r#"read line; echo "got $line""#);

    let launcher = ProcessLauncher::default();
    let request = ProcessRequest::new(&tool).input(b"hello\n".to_vec());

    let result = launcher
        .launch(request, None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.output, "got hello\n");
    assert!(result.success());
}

#[tokio::test]
async fn concurrent_jobs_route_chunks_by_job_id() {
    let dir = TempDir::new().unwrap();
    let tool_a = fake_tool(&dir, "tool-a", "echo a1; echo a2");
    let tool_b = fake_tool(&dir, "tool-b", "echo b1; echo b2");

    let (tx, mut rx) = broadcast::channel(64);
    let launcher = ProcessLauncher::default();
    let cancel = CancellationToken::new();

    let sink_a = BroadcastSink::new(JobId::new("job-a"), tx.clone());
    let sink_b = BroadcastSink::new(JobId::new("job-b"), tx.clone());

    let (res_a, res_b) = tokio::join!(
        launcher.launch(ProcessRequest::new(&tool_a), Some(&sink_a), &cancel),
        launcher.launch(ProcessRequest::new(&tool_b), Some(&sink_b), &cancel),
    );
    assert!(res_a.unwrap().success());
    assert!(res_b.unwrap().success());

    drop(tx);
    let mut chunks_a = Vec::new();
    let mut chunks_b = Vec::new();
    let mut finished = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::Output { id, chunk } => match id.as_str() {
                "job-a" => chunks_a.push(chunk),
                "job-b" => chunks_b.push(chunk),
                other => panic!("unexpected job id {other}"),
            },
            Event::Finished { id, exit_code } => {
                assert_eq!(exit_code, 0);
                finished.push(id.as_str().to_string());
            }
        }
    }

    // Jobs may interleave, but per-job order is preserved
    assert_eq!(chunks_a, vec!["a1\n", "a2\n"]);
    assert_eq!(chunks_b, vec!["b1\n", "b2\n"]);

    // Every job announces its completion exactly once
    finished.sort();
    assert_eq!(finished, vec!["job-a", "job-b"]);
}

#[tokio::test]
async fn external_timer_cancels_a_long_running_child() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(&dir, "chatty", "while :; do echo tick; sleep 0.1; done");

    let launcher = ProcessLauncher::new(LaunchConfig {
        interrupt_grace: Duration::from_secs(2),
        ..Default::default()
    });
    let cancel = CancellationToken::new();

    // Hard timeouts are the caller's job: pair the token with a timer
    let timer_token = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        timer_token.cancel();
    });

    let result = launcher
        .launch(ProcessRequest::new(&tool), None, &cancel)
        .await
        .unwrap();

    assert!(!result.output.is_empty(), "some ticks must have streamed");
    assert_ne!(result.exit_code, 0);
}
