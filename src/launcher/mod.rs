//! Process launching and output streaming
//!
//! [`ProcessLauncher::launch`] is the single entry point for captured
//! execution: spawn the child with redirected standard streams, write the
//! optional stdin payload, pump stdout into the caller's sink one chunk at a
//! time, honor cooperative cancellation, and collect the real exit status.
//!
//! A launch moves through the phases Spawning → Running → Draining → Exited.
//! Spawning fails fast (over-long executable path, binary not found) and
//! nothing is retried. Draining preserves chunk order into both the
//! accumulated buffer and the sink. The accumulated buffer is unbounded;
//! callers expecting very large output should process it incrementally
//! through the sink instead.

mod pipes;
mod shutdown;


use crate::config::LaunchConfig;
use crate::error::{Error, LaunchError, Result};
use crate::types::{ABNORMAL_EXIT_CODE, OutputSink, ProcessRequest, ProcessResult};
use pipes::ChildPipes;
use std::pin::Pin;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Launches external download tools and streams their output
///
/// Stateless apart from its configuration: one instance can serve any number
/// of sequential or concurrent launches, each with its own child process and
/// pipe pair.
#[derive(Clone, Debug, Default)]
pub struct ProcessLauncher {
    config: LaunchConfig,
}

impl ProcessLauncher {
    /// Create a launcher with the given configuration
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    /// Launch `request` and supervise the child until it exits or `cancel` fires
    ///
    /// Exactly one [`ProcessResult`] is produced per call. The `sink`, when
    /// present, is invoked once per output chunk, in the order the child
    /// produced them, and never after this function returns. When `sink` is
    /// absent output is still accumulated into the result.
    ///
    /// Cancellation is cooperative: the token is checked after each chunk, so
    /// a child that produces no output is not interrupted until it does or
    /// exits. On cancellation the child is interrupted, given
    /// [`LaunchConfig::interrupt_grace`] to exit, then killed outright; the
    /// reported exit code is whatever the child actually exited with.
    pub async fn launch(
        &self,
        request: ProcessRequest,
        sink: Option<&dyn OutputSink>,
        cancel: &CancellationToken,
    ) -> Result<ProcessResult> {
        // Spawning
        let exe_len = request.executable.as_os_str().len();
        if exe_len > self.config.max_exe_path_len {
            return Err(Error::config_key(
                format!(
                    "executable path is {exe_len} bytes, limit is {}",
                    self.config.max_exe_path_len
                ),
                "max_exe_path_len",
            ));
        }

        debug!(
            executable = %request.executable.display(),
            args = ?request.args,
            "spawning child"
        );

        let mut child = Command::new(&request.executable)
            .args(&request.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                executable: request.executable.clone(),
                source,
            })?;

        let mut pipes = match ChildPipes::split(&mut child) {
            Ok(pipes) => pipes,
            Err(e) => {
                // Partially wired children must not outlive the launch
                child.kill().await.ok();
                child.wait().await.ok();
                return Err(e);
            }
        };

        // Running: feed the payload, then close stdin so the child sees EOF
        // even if it never reads from it
        let mut input_write_error = None;
        if let Some(payload) = &request.input {
            if let Err(e) = pipes.write_input(payload).await {
                warn!(error = %e, "stdin write failed, continuing with read phase");
                input_write_error = Some(e.to_string());
            }
        } else {
            pipes.close_stdin();
        }

        // Draining
        let stdout = pipes
            .take_stdout()
            .ok_or(LaunchError::MissingPipe { stream: "stdout" })?;
        let mut reader = BufReader::with_capacity(self.config.chunk_capacity, stdout);
        let mut output = String::new();
        let mut chunk: Vec<u8> = Vec::with_capacity(self.config.chunk_capacity);
        let mut cancelled = false;

        loop {
            chunk.clear();
            match read_chunk(&mut reader, &mut chunk, self.config.chunk_capacity).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&chunk);
                    output.push_str(&text);
                    if let Some(sink) = sink {
                        sink.consume(&text).await;
                    }
                }
                Err(e) => {
                    // Partial output is more useful to the caller than none
                    warn!(error = %e, "error reading child output, treating as end of stream");
                    break;
                }
            }

            if cancel.is_cancelled() {
                debug!("cancellation requested, interrupting child");
                shutdown::interrupt(&child);
                cancelled = true;
                break;
            }
        }

        drop(reader);
        pipes.close();

        // Exited: always collect the real status
        let status = if cancelled {
            shutdown::reap_cancelled(&mut child, self.config.interrupt_grace).await
        } else {
            child.wait().await
        }
        .map_err(LaunchError::Wait)?;

        let exit_code = status.code().unwrap_or(ABNORMAL_EXIT_CODE);
        debug!(%exit_code, output_bytes = output.len(), "child exited");

        if let Some(sink) = sink {
            sink.finished(exit_code).await;
        }

        Ok(ProcessResult {
            exit_code,
            output,
            input_write_error,
        })
    }
}

/// Read one output chunk: a complete line up to and including its newline,
/// or exactly `cap` bytes when no newline arrives within the buffer
///
/// Bytes that reach the pipe in several writes are accumulated until the
/// line terminator shows up, so the sink never sees sub-line fragments.
/// Returns the number of bytes appended to `buf`; 0 means end of stream.
async fn read_chunk<R>(reader: &mut R, buf: &mut Vec<u8>, cap: usize) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            // End of stream; a trailing line without a newline still counts
            return Ok(buf.len());
        }

        let remaining = cap - buf.len();
        let (len, complete) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) if pos < remaining => (pos + 1, true),
            _ => {
                let len = available.len().min(remaining);
                (len, len == remaining)
            }
        };

        buf.extend_from_slice(&available[..len]);
        Pin::new(&mut *reader).consume(len);
        if complete {
            return Ok(buf.len());
        }
    }
}
