use std::io;
use std::path::PathBuf;

use thiserror::Error as ThisError;

use crate::client::error::ConfigError;
use crate::client::http::TransportError;

/// Failure to obtain a picked image or to resolve its URI to bytes.
#[derive(Debug, ThisError)]
pub enum SourceError {
    #[error("could not read '{}'", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("could not store picked image at '{}'", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("unsupported image URI '{0}'")]
    UnsupportedUri(String),

    #[error("invalid image URI '{uri}'")]
    InvalidUri { uri: String, source: ConfigError },

    #[error("fetching '{uri}' failed")]
    Transport { uri: String, source: TransportError },

    #[error("fetching '{uri}' returned HTTP {status}")]
    Status { uri: String, status: u16 },
}
