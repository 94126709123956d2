//! Download request variants and argument-vector building
//!
//! A [`DownloadRequest`] is the structured form of one download-tool
//! invocation, tagged by mode. Construction validates the URL and the
//! playlist index expression, so a value that exists is always well
//! formed and [`DownloadRequest::args`] can stay infallible and pure.
//!
//! The serde shape matches the message-layer boundary: an internally tagged
//! object with a `mode` field, e.g.
//! `{"mode": "playlist_video", "url": "...", "indexes": "1-5,8"}`.
//! Deserialization runs the same validation as the constructors because the
//! URL and index fields are `try_from`-validated newtypes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A validated media URL
///
/// Stored as the original string (the download tool receives it verbatim);
/// validation only checks that it parses as an absolute URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaUrl(String);

impl MediaUrl {
    /// Get the URL string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MediaUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(Error::InvalidRequest("missing URL".to_string()));
        }
        url::Url::parse(&value)
            .map_err(|e| Error::InvalidRequest(format!("malformed URL {value:?}: {e}")))?;
        Ok(Self(value))
    }
}

impl std::str::FromStr for MediaUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

impl From<MediaUrl> for String {
    fn from(url: MediaUrl) -> Self {
        url.0
    }
}

impl std::fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated playlist index expression such as `"1-5,8"`
///
/// Grammar: comma-separated items, each either a single 1-based index or an
/// ascending `start-end` range. The validated string is passed verbatim to
/// the download tool's index-range flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaylistIndexes(String);

impl PlaylistIndexes {
    /// Get the index expression string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlaylistIndexes {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        let expr = value.trim();
        if expr.is_empty() {
            return Err(Error::InvalidRequest(
                "empty playlist index expression".to_string(),
            ));
        }

        for item in expr.split(',') {
            match item.split_once('-') {
                None => {
                    parse_index(item)?;
                }
                Some((start, end)) => {
                    let start = parse_index(start)?;
                    let end = parse_index(end)?;
                    if start > end {
                        return Err(Error::InvalidRequest(format!(
                            "descending playlist range {item:?}"
                        )));
                    }
                }
            }
        }

        Ok(Self(expr.to_string()))
    }
}

impl std::str::FromStr for PlaylistIndexes {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.to_string())
    }
}

impl From<PlaylistIndexes> for String {
    fn from(indexes: PlaylistIndexes) -> Self {
        indexes.0
    }
}

impl std::fmt::Display for PlaylistIndexes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn parse_index(s: &str) -> Result<u32> {
    let n: u32 = s
        .parse()
        .map_err(|_| Error::InvalidRequest(format!("malformed playlist index {s:?}")))?;
    if n == 0 {
        return Err(Error::InvalidRequest(
            "playlist indexes are 1-based".to_string(),
        ));
    }
    Ok(n)
}

/// One structured download-tool invocation, tagged by mode
///
/// Each variant owns only the fields relevant to its mode. The set is
/// closed: adding a mode means adding a variant, and every `match` on the
/// enum is then checked for exhaustiveness by the compiler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DownloadRequest {
    /// Metadata probe only, no media retrieval
    Info {
        /// Target media URL
        url: MediaUrl,
    },
    /// Single video download, optionally pinned to a format identifier
    Video {
        /// Target media URL
        url: MediaUrl,
        /// Format identifier (e.g. `"137+140"`); omitted means the tool's
        /// default "best" selection
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    /// Single audio extraction
    Audio {
        /// Target media URL
        url: MediaUrl,
    },
    /// Video download of selected playlist entries
    PlaylistVideo {
        /// Target playlist URL
        url: MediaUrl,
        /// Which playlist entries to fetch
        indexes: PlaylistIndexes,
        /// Optional format identifier
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    /// Audio extraction of selected playlist entries
    PlaylistAudio {
        /// Target playlist URL
        url: MediaUrl,
        /// Which playlist entries to fetch
        indexes: PlaylistIndexes,
    },
}

impl DownloadRequest {
    /// Build a metadata-probe request
    pub fn info(url: &str) -> Result<Self> {
        Ok(Self::Info { url: url.parse()? })
    }

    /// Build a single-video request
    pub fn video(url: &str, format: Option<String>) -> Result<Self> {
        Ok(Self::Video {
            url: url.parse()?,
            format: validate_format(format)?,
        })
    }

    /// Build an audio-extraction request
    pub fn audio(url: &str) -> Result<Self> {
        Ok(Self::Audio { url: url.parse()? })
    }

    /// Build a playlist-video request for the given index expression
    pub fn playlist_video(url: &str, indexes: &str, format: Option<String>) -> Result<Self> {
        Ok(Self::PlaylistVideo {
            url: url.parse()?,
            indexes: indexes.parse()?,
            format: validate_format(format)?,
        })
    }

    /// Build a playlist-audio request for the given index expression
    pub fn playlist_audio(url: &str, indexes: &str) -> Result<Self> {
        Ok(Self::PlaylistAudio {
            url: url.parse()?,
            indexes: indexes.parse()?,
        })
    }

    /// The target URL of this request, whatever the mode
    pub fn url(&self) -> &MediaUrl {
        match self {
            Self::Info { url }
            | Self::Video { url, .. }
            | Self::Audio { url }
            | Self::PlaylistVideo { url, .. }
            | Self::PlaylistAudio { url, .. } => url,
        }
    }

    /// Produce the argument vector for the external download tool
    ///
    /// Pure and deterministic: equal requests produce equal vectors, and
    /// every call returns a fresh copy. Flags come first in a stable order;
    /// the URL is always last. Download modes pass `--newline` so progress
    /// output is line-oriented and streams cleanly.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();

        match self {
            Self::Info { .. } => {
                args.push("--dump-json".to_string());
            }
            Self::Video { format, .. } => {
                args.push("--newline".to_string());
                push_format(&mut args, format);
            }
            Self::Audio { .. } => {
                args.push("--newline".to_string());
                args.push("-x".to_string());
            }
            Self::PlaylistVideo {
                indexes, format, ..
            } => {
                args.push("--newline".to_string());
                args.push("--yes-playlist".to_string());
                args.push("--playlist-items".to_string());
                args.push(indexes.as_str().to_string());
                push_format(&mut args, format);
            }
            Self::PlaylistAudio { indexes, .. } => {
                args.push("--newline".to_string());
                args.push("--yes-playlist".to_string());
                args.push("-x".to_string());
                args.push("--playlist-items".to_string());
                args.push(indexes.as_str().to_string());
            }
        }

        args.push(self.url().as_str().to_string());
        args
    }
}

fn push_format(args: &mut Vec<String>, format: &Option<String>) {
    if let Some(format) = format {
        args.push("-f".to_string());
        args.push(format.clone());
    }
}

fn validate_format(format: Option<String>) -> Result<Option<String>> {
    match format {
        Some(f) if f.trim().is_empty() => Err(Error::InvalidRequest(
            "empty format identifier".to_string(),
        )),
        other => Ok(other),
    }
}
