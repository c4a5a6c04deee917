use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;

use crate::client::http::{self, HttpUrl};
use crate::source::error::SourceError;

/// Resolves an image URI to its raw bytes for upload.
pub trait ByteFetcher: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, SourceError>;
}

/// Handles `file://` URIs, plain filesystem paths and `http://` URLs.
#[derive(Debug, Clone)]
pub struct UriFetcher {
    timeout: Duration,
}

impl UriFetcher {
    pub fn new(timeout: Duration) -> UriFetcher {
        UriFetcher { timeout }
    }
}

impl ByteFetcher for UriFetcher {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, SourceError> {
        if let Some(path) = path_from_file_uri(uri) {
            return read_file(path);
        }
        if uri.get(..7).is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://")) {
            let url = HttpUrl::parse(uri)
                .map_err(|source| SourceError::InvalidUri { uri: uri.to_owned(), source })?;
            let response = http::get(&url, self.timeout)
                .map_err(|source| SourceError::Transport { uri: uri.to_owned(), source })?;
            if !response.is_success() {
                return Err(SourceError::Status { uri: uri.to_owned(), status: response.status });
            }
            debug!("fetched {} bytes from {}", response.body.len(), uri);
            return Ok(response.body);
        }
        if uri.contains("://") {
            return Err(SourceError::UnsupportedUri(uri.to_owned()));
        }
        read_file(PathBuf::from(uri))
    }
}

fn read_file(path: PathBuf) -> Result<Vec<u8>, SourceError> {
    let bytes = std::fs::read(&path).map_err(|source| SourceError::Read { path: path.clone(), source })?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(bytes)
}

/// Builds a `file://` URI for an absolute path, escaping the characters
/// that would otherwise end the path component.
pub fn file_uri(path: &Path) -> String {
    let mut uri = String::from("file://");
    for c in path.to_string_lossy().chars() {
        match c {
            ' ' => uri.push_str("%20"),
            '%' => uri.push_str("%25"),
            '#' => uri.push_str("%23"),
            '?' => uri.push_str("%3F"),
            c => uri.push(c),
        }
    }
    uri
}

/// Inverse of `file_uri`; `None` for anything that is not a `file://` URI.
pub fn path_from_file_uri(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix("file://").map(|rest| PathBuf::from(percent_decode(rest)))
}

/// Decodes `%XX` escapes. Malformed sequences are left as-is.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(h), Some(l)) = (hi, lo) {
                out.push(((h << 4) | l) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
