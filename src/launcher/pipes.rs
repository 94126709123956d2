//! Parent-side ownership of a spawned child's standard-stream pipes
//!
//! Both pipes are requested together at spawn time; [`ChildPipes::split`]
//! takes the parent-side ends out of the child handle and owns them from
//! then on. Every close path goes through `Option::take`, so closing twice
//! is a guarded no-op and each descriptor is dropped exactly once.

use crate::error::{LaunchError, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, ChildStdout};

/// The parent's ends of a child's stdin/stdout pipe pair
pub(crate) struct ChildPipes {
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
}

impl ChildPipes {
    /// Split the parent-side pipe ends out of a freshly spawned child
    ///
    /// Fails if either stream was not wired; a child with partial wiring
    /// must not be supervised, so the caller reaps it on this error.
    pub(crate) fn split(child: &mut Child) -> Result<Self> {
        let stdin = child
            .stdin
            .take()
            .ok_or(LaunchError::MissingPipe { stream: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(LaunchError::MissingPipe { stream: "stdout" })?;
        Ok(Self {
            stdin: Some(stdin),
            stdout: Some(stdout),
        })
    }

    /// Write the full input payload, then close the child's stdin
    ///
    /// The write end is closed even when the write fails part-way, so the
    /// child always observes EOF on its stdin afterwards.
    pub(crate) async fn write_input(&mut self, payload: &[u8]) -> std::io::Result<()> {
        let Some(mut stdin) = self.stdin.take() else {
            return Ok(());
        };
        stdin.write_all(payload).await?;
        stdin.shutdown().await?;
        Ok(())
    }

    /// Close the write end without sending anything. No-op if already closed.
    pub(crate) fn close_stdin(&mut self) {
        self.stdin.take();
    }

    /// Hand the read end to the output pump
    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Close whatever ends are still held. Safe to call repeatedly.
    pub(crate) fn close(&mut self) {
        self.stdin.take();
        self.stdout.take();
    }
}
