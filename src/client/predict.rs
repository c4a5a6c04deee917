use std::time::Instant;

use log::{info, warn};
use serde::Serialize;

use crate::client::config::ClientConfig;
use crate::client::error::{ConfigError, RequestError};
use crate::client::http::{self, HttpResponse, HttpUrl};
use crate::client::multipart::MultipartBody;
use crate::client::result::{parse_rejection, parse_success, PredictionResult};
use crate::encode::PixelVector;
use crate::source::{ByteFetcher, ImageReference, UriFetcher};

/// Endpoint taking `{ "pixels": [784 ints] }`.
pub const JSON_ENDPOINT: &str = "/predict_json";
/// Endpoint taking a multipart upload in field `file`.
pub const FILE_ENDPOINT: &str = "/predict";
/// Multipart field name the service reads the image from.
pub const FILE_FIELD: &str = "file";

#[derive(Serialize)]
struct PixelsRequest<'a> {
    pixels: &'a [u8],
}

/// Talks to the remote inference service.
///
/// Both calls block until a response or failure arrives; screens run them on
/// a background thread.
pub struct PredictionClient {
    config: ClientConfig,
    json_url: HttpUrl,
    file_url: HttpUrl,
    fetcher: Box<dyn ByteFetcher>,
}

impl PredictionClient {
    /// Builds a client with the default URI fetcher.
    pub fn new(config: ClientConfig) -> Result<PredictionClient, ConfigError> {
        let base = HttpUrl::parse(&config.base_url)?;
        Ok(PredictionClient {
            json_url: base.join(JSON_ENDPOINT),
            file_url: base.join(FILE_ENDPOINT),
            fetcher: Box::new(UriFetcher::new(config.timeout)),
            config,
        })
    }

    /// Replaces the capability used to resolve image URIs to bytes.
    pub fn with_fetcher(mut self, fetcher: impl ByteFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Vector mode: classifies an encoded grid.
    pub fn predict_pixels(&self, pixels: &PixelVector) -> Result<PredictionResult, RequestError> {
        let body = serde_json::to_vec(&PixelsRequest { pixels: pixels.as_slice() })
            .map_err(|e| {
                // Serializing a byte slice cannot fail in practice.
                warn!("could not serialize pixel vector: {}", e);
                RequestError::NoResponse
            })?;
        self.send(&self.json_url, "application/json", &body)
    }

    /// File mode: resolves the image's URI and uploads its bytes.
    pub fn predict_file(&self, image: &ImageReference) -> Result<PredictionResult, RequestError> {
        let bytes = self.fetcher.fetch(&image.uri).map_err(|e| {
            warn!("could not load '{}' for upload: {}", image.uri, error_chain(&e));
            RequestError::NoResponse
        })?;
        let body = MultipartBody::single_file(FILE_FIELD, &image.filename, &image.mime_type, &bytes);
        self.send(&self.file_url, &body.content_type(), body.as_bytes())
    }

    fn send(&self, url: &HttpUrl, content_type: &str, body: &[u8]) -> Result<PredictionResult, RequestError> {
        info!("POST {} ({} bytes)", url, body.len());
        let started = Instant::now();

        let response = http::post(url, content_type, body, self.config.timeout).map_err(|e| {
            warn!("POST {} failed: {}", url, error_chain(&e));
            RequestError::NoResponse
        })?;

        let outcome = interpret(&response);
        match &outcome {
            Ok(result) => info!(
                "POST {} -> {} in {} ms: digit {}",
                url,
                response.status,
                started.elapsed().as_millis(),
                result.digit()
            ),
            Err(e) => warn!("POST {} -> {}: {}", url, response.status, e),
        }
        outcome
    }
}

fn interpret(response: &HttpResponse) -> Result<PredictionResult, RequestError> {
    if response.is_success() {
        parse_success(&response.body)
    } else {
        Err(parse_rejection(response.status, &response.body))
    }
}

/// Renders an error with all of its sources, `outer: inner: ...`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
