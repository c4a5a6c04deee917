//! Minimal blocking HTTP/1.1 client.
//!
//! One TCP connection per request with `Connection: close`. Enough for the
//! inference service's two POST endpoints and for fetching image bytes from
//! `http://` URIs; TLS is not supported.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use thiserror::Error as ThisError;

use crate::client::error::ConfigError;

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

/// A parsed `http://host[:port][/path]` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpUrl {
    pub host: String,
    pub port: u16,
    /// Always starts with `/`.
    pub path: String,
}

impl HttpUrl {
    pub fn parse(url: &str) -> Result<HttpUrl, ConfigError> {
        let url = url.trim();
        let rest = match url.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => rest,
            Some(_) => return Err(ConfigError::UnsupportedScheme(url.to_owned())),
            None => return Err(ConfigError::InvalidUrl(url.to_owned())),
        };

        let (authority, path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos..]),
            None => (rest, "/"),
        };

        let (host, port) = split_host_port(authority)
            .ok_or_else(|| ConfigError::InvalidUrl(url.to_owned()))?;
        if host.is_empty() {
            return Err(ConfigError::InvalidUrl(url.to_owned()));
        }

        Ok(HttpUrl { host: host.to_owned(), port, path: path.to_owned() })
    }

    /// Appends `endpoint` to this URL's path, collapsing the slash between them.
    pub fn join(&self, endpoint: &str) -> HttpUrl {
        let base = self.path.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        HttpUrl {
            host: self.host.clone(),
            port: self.port,
            path: format!("{}/{}", base, endpoint),
        }
    }

    /// `host:port` as sent in the `Host` header.
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl std::fmt::Display for HttpUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}{}", self.authority(), self.path)
    }
}

fn split_host_port(authority: &str) -> Option<(&str, u16)> {
    // Bracketed IPv6 literal: [::1]:5000
    if let Some(rest) = authority.strip_prefix('[') {
        let end = rest.find(']')?;
        let host = &rest[..end];
        let port = match &rest[end + 1..] {
            "" => 80,
            p => p.strip_prefix(':')?.parse().ok()?,
        };
        return Some((host, port));
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => Some((host, port.parse().ok()?)),
        None => Some((authority, 80)),
    }
}

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("could not resolve host '{host}'")]
    Resolve { host: String, source: io::Error },

    #[error("could not connect to {authority}")]
    Connect { authority: String, source: io::Error },

    #[error("connection failed mid-exchange")]
    Io(#[from] io::Error),

    #[error("invalid HTTP response: {0}")]
    Protocol(String),
}

/// A fully read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Largest response body accepted from the inference service.
pub const MAX_REPLY_BYTES: usize = 1 << 20;

/// Largest image fetched over `http://`.
pub const MAX_IMAGE_BYTES: usize = 32 << 20;

/// `POST url` with the given body. `timeout` bounds the whole exchange.
pub fn post(
    url: &HttpUrl,
    content_type: &str,
    body: &[u8],
    timeout: Duration,
) -> Result<HttpResponse, TransportError> {
    exchange("POST", url, Some((content_type, body)), timeout, MAX_REPLY_BYTES)
}

/// `GET url`. `timeout` bounds the whole exchange.
pub fn get(url: &HttpUrl, timeout: Duration) -> Result<HttpResponse, TransportError> {
    exchange("GET", url, None, timeout, MAX_IMAGE_BYTES)
}

fn exchange(
    method: &str,
    url: &HttpUrl,
    body: Option<(&str, &[u8])>,
    timeout: Duration,
    limit: usize,
) -> Result<HttpResponse, TransportError> {
    // A zero duration is rejected by the socket API.
    let timeout = timeout.max(Duration::from_millis(1));
    let deadline = Instant::now() + timeout;
    let mut stream = DeadlineStream { stream: connect(url, timeout)?, deadline };

    let mut head = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nAccept: application/json\r\nConnection: close\r\n",
        method,
        url.path,
        url.authority()
    );
    match body {
        Some((content_type, bytes)) => {
            head.push_str(&format!(
                "Content-Type: {}\r\nContent-Length: {}\r\n\r\n",
                content_type,
                bytes.len()
            ));
            stream.write_all(head.as_bytes())?;
            stream.write_all(bytes)?;
        }
        None => {
            head.push_str("\r\n");
            stream.write_all(head.as_bytes())?;
        }
    }
    stream.flush()?;

    read_response(&mut BufReader::new(stream), limit)
}

fn connect(url: &HttpUrl, timeout: Duration) -> Result<TcpStream, TransportError> {
    let addrs = (url.host.as_str(), url.port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve { host: url.host.clone(), source })?;

    let mut last_err = io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses");
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = e,
        }
    }
    Err(TransportError::Connect { authority: url.authority(), source: last_err })
}

/// A socket whose every read and write is bounded by what is left of one
/// overall deadline.
struct DeadlineStream {
    stream: TcpStream,
    deadline: Instant,
}

impl DeadlineStream {
    fn remaining(&self) -> io::Result<Duration> {
        let left = self.deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            Err(io::Error::new(io::ErrorKind::TimedOut, "request deadline passed"))
        } else {
            Ok(left)
        }
    }
}

impl Read for DeadlineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let left = self.remaining()?;
        self.stream.set_read_timeout(Some(left))?;
        self.stream.read(buf)
    }
}

impl Write for DeadlineStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let left = self.remaining()?;
        self.stream.set_write_timeout(Some(left))?;
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Reads one response: status line, headers, then the body framed by
/// `Transfer-Encoding: chunked`, `Content-Length`, or connection close.
/// Interim `1xx` responses are skipped. Bodies larger than `limit` bytes
/// are refused.
pub fn read_response<R: BufRead>(reader: &mut R, limit: usize) -> Result<HttpResponse, TransportError> {
    loop {
        let status = read_status_line(reader)?;
        let headers = read_headers(reader)?;
        if (100..200).contains(&status) {
            continue;
        }

        let mut response = HttpResponse { status, headers, body: Vec::new() };
        let chunked = response
            .header("Transfer-Encoding")
            .map(|v| v.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false);

        response.body = if chunked {
            read_chunked(reader, limit)?
        } else if let Some(len) = response.header("Content-Length") {
            let len: usize = len
                .trim()
                .parse()
                .map_err(|_| TransportError::Protocol(format!("bad Content-Length '{}'", len)))?;
            if len > limit {
                return Err(too_large(len, limit));
            }
            let mut body = Vec::new();
            read_exactly(reader, len, &mut body)?;
            body
        } else {
            let mut body = Vec::new();
            reader.by_ref().take(limit as u64 + 1).read_to_end(&mut body)?;
            if body.len() > limit {
                return Err(too_large(body.len(), limit));
            }
            body
        };
        return Ok(response);
    }
}

fn too_large(len: usize, limit: usize) -> TransportError {
    TransportError::Protocol(format!("body of {} bytes exceeds the {} byte limit", len, limit))
}

/// Appends exactly `len` bytes to `out`, growing it only as data arrives.
fn read_exactly<R: Read>(reader: &mut R, len: usize, out: &mut Vec<u8>) -> Result<(), TransportError> {
    let got = reader.by_ref().take(len as u64).read_to_end(out)?;
    if got < len {
        return Err(TransportError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("body ended after {} of {} bytes", got, len),
        )));
    }
    Ok(())
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>, TransportError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}

fn read_status_line<R: BufRead>(reader: &mut R) -> Result<u16, TransportError> {
    let line = read_line(reader)?
        .ok_or_else(|| TransportError::Protocol("connection closed before status line".into()))?;
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/") {
        return Err(TransportError::Protocol(format!("bad status line '{}'", line)));
    }
    parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| TransportError::Protocol(format!("bad status line '{}'", line)))
}

fn read_headers<R: BufRead>(reader: &mut R) -> Result<Vec<(String, String)>, TransportError> {
    let mut headers = Vec::new();
    loop {
        let line = read_line(reader)?
            .ok_or_else(|| TransportError::Protocol("connection closed inside headers".into()))?;
        if line.is_empty() {
            return Ok(headers);
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_owned(), value.trim().to_owned()));
        }
    }
}

fn read_chunked<R: BufRead>(reader: &mut R, limit: usize) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    loop {
        let line = read_line(reader)?
            .ok_or_else(|| TransportError::Protocol("connection closed inside chunked body".into()))?;
        let size_hex = line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| TransportError::Protocol(format!("bad chunk size '{}'", line)))?;

        if size == 0 {
            // Trailers, terminated by an empty line (or EOF).
            while let Some(trailer) = read_line(reader)? {
                if trailer.is_empty() {
                    break;
                }
            }
            return Ok(body);
        }

        total = total
            .checked_add(size)
            .filter(|t| *t <= limit)
            .ok_or_else(|| too_large(total.saturating_add(size), limit))?;
        read_exactly(reader, size, &mut body)?;
        read_line(reader)?;
    }
}
