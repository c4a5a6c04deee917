use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use tiny_http::{Request, Response};

use digit_sketch::source::{
    file_uri, mime_from_path, path_from_file_uri, ByteFetcher, ImagePicker, PickedImage, SourceError, UriFetcher,
};
use digit_sketch::ActionError;

use crate::render::{caption_html, html_escape, render_page, Page};
use crate::routes::{bytes_response, content_type, html_response, not_found, redirect};
use crate::state::{lock, FlashMessage, SharedState};
use crate::util::multipart::{extract_boundary, extract_file_part, FilePart};

/// Form field the upload input posts under.
const UPLOAD_FIELD: &str = "image";

// ---------------------------------------------------------------------------
// Upload-backed picker
// ---------------------------------------------------------------------------

/// Turns a browser upload into a picked image by storing it under `dir`.
/// A form submitted without a file is a cancellation.
struct UploadPicker {
    part: Option<FilePart>,
    dir:  PathBuf,
}

impl ImagePicker for UploadPicker {
    fn pick(&mut self) -> Result<Option<PickedImage>, SourceError> {
        let Some(part) = self.part.take() else {
            return Ok(None);
        };

        std::fs::create_dir_all(&self.dir)
            .map_err(|source| SourceError::Write { path: self.dir.clone(), source })?;
        let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
        let stored = self.dir.join(format!("{}-{}", millis, sanitize_filename(&part.filename)));
        std::fs::write(&stored, &part.data)
            .map_err(|source| SourceError::Write { path: stored.clone(), source })?;
        let stored = stored.canonicalize().unwrap_or(stored);

        let mime_type = part.content_type
            .filter(|m| m.starts_with("image/"))
            .or_else(|| mime_from_path(Path::new(&part.filename)));

        Ok(Some(PickedImage {
            uri:       file_uri(&stored),
            filename:  Some(part.filename),
            mime_type,
        }))
    }
}

/// Keeps letters, digits, `_`, `-` and `.`; everything else becomes `_`.
fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let sanitized: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' { c } else { '_' })
        .collect();
    if sanitized.trim_matches('.').is_empty() { "image".to_owned() } else { sanitized }
}

/// Deletes a stored upload once nothing refers to it any more.
fn discard_upload(uri: &str, upload_dir: &Path) {
    let Some(path) = path_from_file_uri(uri) else {
        return;
    };
    let inside = upload_dir
        .canonicalize()
        .map(|dir| path.starts_with(dir))
        .unwrap_or(false);
    if inside {
        if let Err(e) = std::fs::remove_file(&path) {
            debug!("could not delete upload {}: {}", path.display(), e);
        }
    }
}

// ---------------------------------------------------------------------------
// GET /photo
// ---------------------------------------------------------------------------

pub fn handle_get(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(state);
    st.photo.poll();
    let alert   = st.photo.take_alert();
    let flash   = st.take_flash();
    let pending = st.photo.is_pending();
    let image   = st.photo.current_image().cloned();
    let caption = caption_html(st.photo.caption());
    drop(st);

    let preview = match &image {
        None    => String::new(),
        Some(r) => format!(
            r#"<div class="preview">
  <img src="/photo/image" alt="{name}">
  <form method="POST" action="/photo/remove" class="remove"><button type="submit" title="Remove">&times;</button></form>
</div>
<p class="hint">{name} &middot; {mime}</p>"#,
            name = html_escape(&r.filename),
            mime = html_escape(&r.mime_type),
        ),
    };
    let recognize = if image.is_some() {
        r#"<form method="POST" action="/photo/recognize"><button type="submit" class="btn btn-primary">Recognize</button></form>"#
    } else {
        ""
    };

    let section = format!(
        r#"<form method="POST" action="/photo/pick" enctype="multipart/form-data" class="actions">
  <input type="file" name="{field}" accept="image/png,image/jpeg,image/bmp">
  <button type="submit" class="btn">Choose image</button>
</form>
{preview}
{caption}
<div class="actions">{recognize}</div>"#,
        field     = UPLOAD_FIELD,
        preview   = preview,
        caption   = caption,
        recognize = recognize,
    );

    let page = render_page(Page::Photo, pending, alert.as_ref(), flash.as_ref(), |tmpl| {
        tmpl.replace("{{TAB_CONTENT}}", &section)
    });
    html_response(page)
}

// ---------------------------------------------------------------------------
// GET /photo/image
// ---------------------------------------------------------------------------

pub fn handle_image(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let Some(image) = lock(state).photo.current_image().cloned() else {
        return not_found();
    };
    match UriFetcher::new(Duration::from_secs(5)).fetch(&image.uri) {
        Ok(bytes) => bytes_response(200, &image.mime_type, bytes),
        Err(e) => {
            warn!("preview of '{}' failed: {}", image.uri, e);
            not_found()
        }
    }
}

// ---------------------------------------------------------------------------
// POST /photo/pick
// ---------------------------------------------------------------------------

pub fn handle_pick(request: &mut Request, state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let Some(boundary) = extract_boundary(&content_type(request)) else {
        lock(state).flash = Some(FlashMessage::error("Invalid upload request."));
        return redirect("/photo");
    };

    let mut body: Vec<u8> = Vec::new();
    if let Err(e) = request.as_reader().read_to_end(&mut body) {
        warn!("could not read upload body: {}", e);
        lock(state).flash = Some(FlashMessage::error("The upload was interrupted."));
        return redirect("/photo");
    }

    let mut st = lock(state);
    let previous = st.photo.current_image().map(|r| r.uri.clone());
    let mut picker = UploadPicker {
        part: extract_file_part(&body, &boundary, UPLOAD_FIELD),
        dir:  st.upload_dir.clone(),
    };

    match st.photo.pick_image(&mut picker) {
        Ok(true) => {
            if let Some(uri) = previous {
                discard_upload(&uri, &st.upload_dir);
            }
        }
        Ok(false) => debug!("no file chosen; keeping current image"),
        Err(e) => {
            warn!("storing upload failed: {}", e);
            st.flash = Some(FlashMessage::error(format!("Could not store the picked image: {}", e)));
        }
    }
    redirect("/photo")
}

// ---------------------------------------------------------------------------
// POST /photo/remove  and  POST /photo/recognize
// ---------------------------------------------------------------------------

pub fn handle_remove(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(state);
    if let Some(uri) = st.photo.current_image().map(|r| r.uri.clone()) {
        discard_upload(&uri, &st.upload_dir);
    }
    st.photo.remove_image();
    redirect("/photo")
}

pub fn handle_recognize(state: &SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut st = lock(state);
    match st.photo.recognize_from_image() {
        Ok(()) => {}
        Err(ActionError::Busy) => {
            st.flash = Some(FlashMessage::info("Still waiting for the previous recognition."));
        }
        Err(ActionError::NoImage) => debug!("recognize pressed with no image selected"),
    }
    redirect("/photo")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_upload_names() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(".."), "image");
        assert_eq!(sanitize_filename(""), "image");
    }

    #[test]
    fn upload_picker_stores_file_and_infers_mime() {
        let dir = std::env::temp_dir().join(format!("digit-sketch-uploads-{}", std::process::id()));
        let mut picker = UploadPicker {
            part: Some(FilePart {
                filename:     "seven.png".into(),
                content_type: Some("application/octet-stream".into()),
                data:         b"png-bytes".to_vec(),
            }),
            dir: dir.clone(),
        };

        let picked = picker.pick().unwrap().unwrap();
        assert_eq!(picked.filename.as_deref(), Some("seven.png"));
        assert_eq!(picked.mime_type.as_deref(), Some("image/png"));
        let bytes = UriFetcher::new(Duration::from_secs(1)).fetch(&picked.uri).unwrap();
        assert_eq!(bytes, b"png-bytes");

        // Second pick on the same picker is a cancellation.
        assert_eq!(picker.pick().unwrap(), None);

        discard_upload(&picked.uri, &dir);
        assert!(UriFetcher::new(Duration::from_secs(1)).fetch(&picked.uri).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
