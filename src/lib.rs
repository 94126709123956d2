//! # ytdl-bridge
//!
//! Streaming process-execution engine for external download tools.
//!
//! A GUI or browser front end that drives a tool like `yt-dlp` needs three
//! things from its helper process: launch the tool without blocking, watch
//! its output as it arrives, and stop it mid-flight. This crate is that
//! engine and nothing else: the outer message protocol, dialogs, and
//! filename handling live in the embedding application.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **One child per launch** - No process trees, no supervisor ambitions
//! - **Streaming-first** - Output reaches the caller chunk by chunk, in
//!   order, through a caller-owned sink
//! - **Cooperative cancellation** - A shared token checked between chunks,
//!   escalating from interrupt to forced kill
//!
//! ## Quick Start
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use ytdl_bridge::{DownloadRequest, ProcessLauncher, ProcessRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build the argument vector for an audio-only download
//!     let request = DownloadRequest::audio("https://example.com/watch?v=abc")?;
//!
//!     let launcher = ProcessLauncher::default();
//!     let cancel = CancellationToken::new();
//!
//!     let result = launcher
//!         .launch(
//!             ProcessRequest::new("yt-dlp").args(request.args()),
//!             None,
//!             &cancel,
//!         )
//!         .await?;
//!
//!     println!("exit code {}: {}", result.exit_code, result.output);
//!     Ok(())
//! }
//! ```
//!
//! For incremental output, pass an [`OutputSink`] implementation (or a
//! [`BroadcastSink`] to fan chunks out over a broadcast channel tagged by
//! [`JobId`]); to stop a running child, cancel the token from another task.

#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod error;
pub mod launcher;
pub mod request;
pub mod types;

pub use config::LaunchConfig;
pub use console::{ConsoleLauncher, TerminalDescriptor, resolve_terminal, resolve_terminal_with};
pub use error::{Error, LaunchError, Result};
pub use launcher::ProcessLauncher;
pub use request::{DownloadRequest, MediaUrl, PlaylistIndexes};
pub use types::{
    ABNORMAL_EXIT_CODE, BroadcastSink, Event, JobId, OutputSink, ProcessRequest, ProcessResult,
};
