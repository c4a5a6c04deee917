#![allow(dead_code)]

use std::io::Read;
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tiny_http::{Header, Response, Server};

pub const SEVEN: &str = r#"{"digit": 7, "probabilities": [0.01, 0, 0, 0, 0, 0, 0, 0.91, 0.08, 0]}"#;

/// A request as the stub service saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// What the stub answers with.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Reply {
        Reply { status, body: body.to_owned(), delay: Duration::ZERO }
    }

    pub fn delayed(mut self, delay: Duration) -> Reply {
        self.delay = delay;
        self
    }
}

/// In-process stand-in for the inference service, bound to an ephemeral port.
pub struct StubService {
    pub base_url: String,
    server: Arc<Server>,
    captured: Arc<Mutex<Vec<Captured>>>,
    worker: Option<JoinHandle<()>>,
}

impl StubService {
    pub fn start<F>(respond: F) -> StubService
    where
        F: Fn(&Captured) -> Reply + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind stub service"));
        let addr = server.server_addr().to_ip().expect("tcp listener");
        let captured = Arc::new(Mutex::new(Vec::new()));

        let srv = server.clone();
        let log = captured.clone();
        let worker = thread::spawn(move || {
            for mut request in srv.incoming_requests() {
                let mut body = Vec::new();
                let _ = request.as_reader().read_to_end(&mut body);
                let content_type = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Content-Type"))
                    .map(|h| h.value.as_str().to_owned())
                    .unwrap_or_default();
                let seen = Captured { path: request.url().to_owned(), content_type, body };

                let reply = respond(&seen);
                log.lock().unwrap().push(seen);
                thread::sleep(reply.delay);

                let response = Response::from_string(reply.body)
                    .with_status_code(reply.status)
                    .with_header(Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap());
                let _ = request.respond(response);
            }
        });

        StubService {
            base_url: format!("http://{}", addr),
            server,
            captured,
            worker: Some(worker),
        }
    }

    /// Always answers with the same reply.
    pub fn fixed(reply: Reply) -> StubService {
        StubService::start(move |_| reply.clone())
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Accepts connections and never answers. Keep it alive for the test's duration.
pub struct SilentService {
    pub base_url: String,
    _listener: TcpListener,
    _held: Arc<Mutex<Vec<TcpStream>>>,
}

impl SilentService {
    pub fn start() -> SilentService {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let held = Arc::new(Mutex::new(Vec::new()));

        let accept = listener.try_clone().unwrap();
        let sink = held.clone();
        thread::spawn(move || {
            for stream in accept.incoming().flatten() {
                sink.lock().unwrap().push(stream);
            }
        });

        SilentService { base_url, _listener: listener, _held: held }
    }
}

/// A base URL nothing is listening on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Writes `contents` to a fresh temp file and returns its path.
pub fn temp_image(name: &str, contents: &[u8]) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("digit-sketch-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Locates `needle` in `haystack`.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
