mod common;

use std::time::{Duration, Instant};

use digit_sketch::source::{file_uri, ByteFetcher, SourceError};
use digit_sketch::{encode, ClientConfig, Grid, ImageReference, PredictionClient, RequestError};

use common::{contains_bytes, refused_url, temp_image, Reply, SilentService, StubService, SEVEN};

fn client_for(base_url: &str) -> PredictionClient {
    let config = ClientConfig::default()
        .with_base_url(base_url)
        .with_timeout(Duration::from_millis(500));
    PredictionClient::new(config).unwrap()
}

#[test]
fn vector_mode_posts_pixels_and_parses_prediction() {
    let service = StubService::fixed(Reply::json(200, SEVEN));
    let client = client_for(&service.base_url);

    let mut grid = Grid::new();
    grid.activate(0, 0);
    grid.activate(27, 27);
    let result = client.predict_pixels(&encode(&grid)).unwrap();

    assert_eq!(result.digit(), 7);
    assert_eq!(result.confidence(), 0.91);

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/predict_json");
    assert!(requests[0].content_type.starts_with("application/json"));

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let pixels = body["pixels"].as_array().unwrap();
    assert_eq!(pixels.len(), 784);
    assert_eq!(pixels[0], 0);
    assert_eq!(pixels[783], 0);
    assert!(pixels[1..783].iter().all(|p| p == 255));
}

#[test]
fn file_mode_uploads_multipart_with_name_and_type() {
    let service = StubService::fixed(Reply::json(200, SEVEN));
    let client = client_for(&service.base_url);

    let path = temp_image("upload-seven.png", b"\x89PNG fake image bytes");
    let image = ImageReference::new(file_uri(&path), Some("seven.png".into()), Some("image/png".into()));
    let result = client.predict_file(&image).unwrap();
    assert_eq!(result.digit(), 7);

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.path, "/predict");
    assert!(req.content_type.starts_with("multipart/form-data; boundary="));
    assert!(contains_bytes(&req.body, b"name=\"file\"; filename=\"seven.png\""));
    assert!(contains_bytes(&req.body, b"Content-Type: image/png"));
    assert!(contains_bytes(&req.body, b"\x89PNG fake image bytes"));
}

#[test]
fn file_mode_defaults_filename_and_mime_type() {
    let service = StubService::fixed(Reply::json(200, SEVEN));
    let client = client_for(&service.base_url);

    let path = temp_image("IMG_0001", b"jpeg bytes");
    let image = ImageReference::new(file_uri(&path), None, None);
    client.predict_file(&image).unwrap();

    let req = &service.requests()[0];
    assert!(contains_bytes(&req.body, b"filename=\"IMG_0001\""));
    assert!(contains_bytes(&req.body, b"Content-Type: image/jpeg"));
}

#[test]
fn server_error_message_becomes_rejection() {
    let service = StubService::fixed(Reply::json(400, r#"{"error": "invalid pixel count"}"#));
    let client = client_for(&service.base_url);

    let err = client.predict_pixels(&encode(&Grid::new())).unwrap_err();
    assert_eq!(err, RequestError::ServerRejected("invalid pixel count".into()));
}

#[test]
fn status_without_error_field_is_described_generically() {
    let service = StubService::fixed(Reply::json(500, "Internal Server Error"));
    let client = client_for(&service.base_url);

    let err = client.predict_pixels(&encode(&Grid::new())).unwrap_err();
    assert_eq!(err, RequestError::ServerRejected("HTTP error 500".into()));
}

#[test]
fn success_with_wrong_shape_is_malformed() {
    for body in [
        r#"{"digit": 7}"#,
        r#"{"digit": 7, "probabilities": [0.5, 0.5]}"#,
        r#"{"result": "seven"}"#,
        "",
    ] {
        let service = StubService::fixed(Reply::json(200, body));
        let client = client_for(&service.base_url);
        let err = client.predict_pixels(&encode(&Grid::new())).unwrap_err();
        assert_eq!(err, RequestError::Malformed, "body: {body}");
    }
}

#[test]
fn silent_service_times_out_as_no_response() {
    let service = SilentService::start();
    let config = ClientConfig::default()
        .with_base_url(&service.base_url)
        .with_timeout(Duration::from_millis(200));
    let client = PredictionClient::new(config).unwrap();

    let started = Instant::now();
    let err = client.predict_pixels(&encode(&Grid::new())).unwrap_err();
    assert_eq!(err, RequestError::NoResponse);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn refused_connection_is_no_response() {
    let client = client_for(&refused_url());
    let err = client.predict_pixels(&encode(&Grid::new())).unwrap_err();
    assert_eq!(err, RequestError::NoResponse);
}

#[test]
fn unreadable_image_is_never_sent() {
    let service = StubService::fixed(Reply::json(200, SEVEN));
    let client = client_for(&service.base_url);

    let image = ImageReference::new("file:///no/such/dir/seven.png", None, None);
    assert_eq!(client.predict_file(&image).unwrap_err(), RequestError::NoResponse);
    assert!(service.requests().is_empty());
}

struct InMemory(Vec<u8>);

impl ByteFetcher for InMemory {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, SourceError> {
        if uri.starts_with("memory:") {
            Ok(self.0.clone())
        } else {
            Err(SourceError::UnsupportedUri(uri.to_owned()))
        }
    }
}

#[test]
fn custom_fetcher_resolves_platform_uris() {
    let service = StubService::fixed(Reply::json(200, SEVEN));
    let client = client_for(&service.base_url).with_fetcher(InMemory(b"from memory".to_vec()));

    let image = ImageReference::new("memory:photo-1", Some("photo.jpg".into()), None);
    client.predict_file(&image).unwrap();
    assert!(contains_bytes(&service.requests()[0].body, b"from memory"));
}

#[test]
fn http_image_uris_are_fetched_before_upload() {
    let image_host = StubService::fixed(Reply::json(200, "remote image bytes"));
    let service = StubService::fixed(Reply::json(200, SEVEN));
    let client = client_for(&service.base_url);

    let image = ImageReference::new(format!("{}/pics/seven.jpg", image_host.base_url), None, None);
    client.predict_file(&image).unwrap();

    assert_eq!(image_host.requests()[0].path, "/pics/seven.jpg");
    let req = &service.requests()[0];
    assert!(contains_bytes(&req.body, b"filename=\"seven.jpg\""));
    assert!(contains_bytes(&req.body, b"remote image bytes"));
}

/// Accepts one connection, drains the request head and answers with `raw`.
fn canned_service(raw: &'static str) -> String {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    std::thread::spawn(move || {
        if let Ok((mut conn, _)) = listener.accept() {
            let mut request = [0u8; 8192];
            let _ = conn.read(&mut request);
            let _ = conn.write_all(raw.as_bytes());
        }
    });
    base_url
}

#[test]
fn absurd_announced_body_is_no_response() {
    for raw in [
        "HTTP/1.1 200 OK\r\nContent-Length: 4611686018427387903\r\n\r\n{}",
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3fffffffffffffff\r\n{}",
    ] {
        let client = client_for(&canned_service(raw));
        let err = client.predict_pixels(&encode(&Grid::new())).unwrap_err();
        assert_eq!(err, RequestError::NoResponse, "reply: {raw}");
    }
}
