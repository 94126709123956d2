//! Core types for ytdl-bridge

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Exit code reported when the child terminated without a normal exit status
/// (e.g. it was killed by a signal), so no real code exists to report.
pub const ABNORMAL_EXIT_CODE: i32 = -1;

/// Identifier of a logical download job
///
/// The message-dispatch layer assigns one per request and uses it to route
/// streamed output chunks back to the right front-end consumer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new JobId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One launch of an external executable
///
/// Argument entries are passed verbatim to the child, never through a shell,
/// so no quoting or escaping is applied or required.
#[derive(Clone, Debug)]
pub struct ProcessRequest {
    /// Path to the executable to launch
    pub executable: PathBuf,
    /// Ordered argument list, passed verbatim
    pub args: Vec<String>,
    /// Optional payload written to the child's stdin before output is read
    pub input: Option<Vec<u8>>,
}

impl ProcessRequest {
    /// Create a request with no arguments and no stdin payload
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            input: None,
        }
    }

    /// Append arguments to the request
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the stdin payload written before the read phase begins
    #[must_use]
    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }
}

/// Outcome of one launch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// The child's exit code: 0 on normal success, any other value is
    /// caller-interpreted, [`ABNORMAL_EXIT_CODE`] if the child did not exit
    /// normally
    pub exit_code: i32,
    /// Accumulated output in the exact order the child produced it; empty if
    /// the child produced nothing
    pub output: String,
    /// Warning recorded when the stdin payload could not be written in full.
    /// The read phase still ran; the output may still be valid.
    pub input_write_error: Option<String>,
}

impl ProcessResult {
    /// Whether the child exited with code 0
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Events emitted while a launch is in flight
///
/// Consumers subscribe via a [`broadcast`] channel; see [`BroadcastSink`].
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A chunk of child output arrived for a job
    Output {
        /// The job the chunk belongs to
        id: JobId,
        /// The chunk text, including its trailing newline when one was read
        chunk: String,
    },
    /// A launch finished and produced its final exit code
    Finished {
        /// The job that finished
        id: JobId,
        /// The child's exit code
        exit_code: i32,
    },
}

/// Caller-owned capability that receives streamed output chunks
///
/// Invoked once per chunk, in child-output order, zero or more times per
/// launch, and never after the launch has returned its result.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Consume one chunk of child output
    async fn consume(&self, chunk: &str);

    /// Observe the final exit code, after the last chunk and before the
    /// launch returns its result. The default does nothing.
    async fn finished(&self, _exit_code: i32) {}
}

/// [`OutputSink`] adapter that tags chunks with a [`JobId`] and forwards them
/// over a broadcast channel
///
/// This is the routing glue between the launch engine and the message
/// dispatcher: each concurrent launch gets its own `BroadcastSink` so
/// subscribers can tell interleaved jobs apart.
#[derive(Clone, Debug)]
pub struct BroadcastSink {
    id: JobId,
    tx: broadcast::Sender<Event>,
}

impl BroadcastSink {
    /// Create a sink that routes chunks for `id` into `tx`
    pub fn new(id: JobId, tx: broadcast::Sender<Event>) -> Self {
        Self { id, tx }
    }
}

#[async_trait]
impl OutputSink for BroadcastSink {
    async fn consume(&self, chunk: &str) {
        // A send error only means nobody is subscribed right now
        self.tx
            .send(Event::Output {
                id: self.id.clone(),
                chunk: chunk.to_string(),
            })
            .ok();
    }

    async fn finished(&self, exit_code: i32) {
        self.tx
            .send(Event::Finished {
                id: self.id.clone(),
                exit_code,
            })
            .ok();
    }
}
