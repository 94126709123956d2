//! Configuration types for ytdl-bridge

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Launch engine configuration
///
/// Controls the limits and timings of the process execution engine. The
/// defaults work for a typical desktop host; embedders that supervise very
/// slow tools may want a longer interrupt grace period.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Maximum accepted executable path length in bytes (default: 4096)
    ///
    /// A longer path is a configuration error, reported before any child
    /// process is spawned.
    #[serde(default = "default_max_exe_path_len")]
    pub max_exe_path_len: usize,

    /// Grace period between the interrupt signal and forced kill when a
    /// launch is cancelled, in seconds (default: 5)
    ///
    /// On cancellation the child receives an interrupt first; if it has not
    /// exited after this period it is forcibly terminated.
    #[serde(default = "default_interrupt_grace", with = "duration_serde")]
    pub interrupt_grace: Duration,

    /// Read buffer capacity for the output pump in bytes (default: 1024)
    ///
    /// Output is delivered per line; a line longer than this arrives as
    /// multiple buffer-sized chunks.
    #[serde(default = "default_chunk_capacity")]
    pub chunk_capacity: usize,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            max_exe_path_len: default_max_exe_path_len(),
            interrupt_grace: default_interrupt_grace(),
            chunk_capacity: default_chunk_capacity(),
        }
    }
}

fn default_max_exe_path_len() -> usize {
    4096
}

fn default_interrupt_grace() -> Duration {
    Duration::from_secs(5)
}

fn default_chunk_capacity() -> usize {
    1024
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
