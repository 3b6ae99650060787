use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while walking a token stream.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// An `_open` token without its `_close` (or the reverse).
    #[error("unmatched `{kind}` token at position {position}")]
    Unbalanced { kind: String, position: usize },

    /// A converter could not build a valid block from well-formed input.
    #[error("cannot convert `{kind}` at position {position}: {reason}")]
    Failed {
        kind: String,
        position: usize,
        reason: String,
    },

    #[error("converter for `{kind}` at position {position} did not advance the cursor")]
    Stalled { kind: String, position: usize },
}

impl ConvertError {
    pub fn failed(kind: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        ConvertError::Failed {
            kind: kind.into(),
            position,
            reason: reason.into(),
        }
    }

    /// Only per-construct failures may be skipped; everything else aborts the document.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConvertError::Failed { .. })
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("token type `{token_type}` is claimed by both `{existing}` and `{duplicate}`")]
    Duplicate {
        token_type: &'static str,
        existing: &'static str,
        duplicate: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response from Notion: {0}")]
    Decode(String),
}
