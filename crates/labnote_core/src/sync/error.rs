//! Sync error taxonomy.
//!
//! Callers branch on variants, never on message text: configuration problems
//! send the user to settings, API errors are shown verbatim, and a missing
//! remote file is not an error at all (see `PullOutcome::NotFound`).

use crate::repo::{ImportError, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Missing remote credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    MissingToken,
    MissingOwner,
    MissingRepo,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let field = match self {
            Self::MissingToken => "token",
            Self::MissingOwner => "owner",
            Self::MissingRepo => "repo",
        };
        write!(f, "sync configuration is missing `{field}`")
    }
}

impl Error for ConfigError {}

#[derive(Debug)]
pub enum SyncError {
    Config(ConfigError),
    /// Remote answered with a non-success status.
    Api { status: u16, message: String },
    /// Request never produced a response (DNS, TLS, connection reset...).
    Transport(reqwest::Error),
    /// Response body was not the expected shape or encoding.
    Decode(String),
    Export(RepoError),
    Import(ImportError),
    /// Another sync is already running on this service.
    Busy,
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Api { status, message } => write!(f, "remote API error ({status}): {message}"),
            Self::Transport(err) => write!(f, "remote request failed: {err}"),
            Self::Decode(message) => write!(f, "unexpected remote response: {message}"),
            Self::Export(err) => write!(f, "local export failed: {err}"),
            Self::Import(err) => write!(f, "remote data rejected: {err}"),
            Self::Busy => write!(f, "a sync is already in progress"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Transport(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Api { .. } | Self::Decode(_) | Self::Busy => None,
        }
    }
}

impl From<ConfigError> for SyncError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl From<ImportError> for SyncError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}
