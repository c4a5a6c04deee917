use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::handlers;
use crate::state::SharedState;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

pub fn bytes_response(status: u16, content_type: &str, bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        [header("Content-Type", content_type), header("Cache-Control", "no-store")]
            .into_iter()
            .flatten()
            .collect(),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "text/html; charset=utf-8", body.into_bytes())
}

pub fn json_response(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(status, "application/json", body.into_bytes())
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    Response::new(
        StatusCode(303),
        header("Location", location).into_iter().collect(),
        Cursor::new(Vec::new()),
        Some(0),
        None,
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    bytes_response(404, "text/plain", b"404 Not Found".to_vec())
}

/// Value of the request's Content-Type header, or an empty string.
pub fn content_type(request: &Request) -> String {
    request.headers().iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// Handlers that read a body receive `&mut Request`; the dispatcher keeps
/// ownership and responds at the end.
pub fn dispatch(mut request: Request, state: SharedState) {
    let method = request.method().clone();
    let url    = request.url().to_owned();
    let path   = url.split('?').next().unwrap_or("").to_owned();

    log::debug!("{} {}", method, path);

    let response = match (method, path.as_str()) {
        (Method::Get, "/") => redirect("/draw"),

        // ── Draw ─────────────────────────────────────────────────────────
        (Method::Get,  "/draw")           => handlers::draw::handle_get(&state),
        (Method::Post, "/draw/stroke")    => handlers::draw::handle_stroke(&mut request, &state),
        (Method::Post, "/draw/reset")     => handlers::draw::handle_reset(&state),
        (Method::Post, "/draw/recognize") => handlers::draw::handle_recognize(&state),

        // ── Photo ────────────────────────────────────────────────────────
        (Method::Get,  "/photo")           => handlers::photo::handle_get(&state),
        (Method::Get,  "/photo/image")     => handlers::photo::handle_image(&state),
        (Method::Post, "/photo/pick")      => handlers::photo::handle_pick(&mut request, &state),
        (Method::Post, "/photo/remove")    => handlers::photo::handle_remove(&state),
        (Method::Post, "/photo/recognize") => handlers::photo::handle_recognize(&state),

        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        log::debug!("client went away before the response was sent: {}", e);
    }
}
