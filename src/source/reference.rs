use crate::source::picker::PickedImage;

/// Filename used when the picker does not supply one.
pub const DEFAULT_FILENAME: &str = "image.jpg";
/// MIME type used when the picker does not supply one.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// A picked image: where its bytes live and how to label them on upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub uri: String,
    pub filename: String,
    pub mime_type: String,
}

impl ImageReference {
    /// Builds a reference, filling in whatever the source left out.
    ///
    /// The filename falls back to the last path segment of `uri`, then to
    /// `DEFAULT_FILENAME`; the MIME type falls back to `DEFAULT_MIME_TYPE`.
    pub fn new(uri: impl Into<String>, filename: Option<String>, mime_type: Option<String>) -> ImageReference {
        let uri = uri.into();
        let filename = non_blank(filename)
            .or_else(|| last_segment(&uri))
            .unwrap_or_else(|| DEFAULT_FILENAME.to_owned());
        let mime_type = non_blank(mime_type).unwrap_or_else(|| DEFAULT_MIME_TYPE.to_owned());
        ImageReference { uri, filename, mime_type }
    }
}

impl From<PickedImage> for ImageReference {
    fn from(picked: PickedImage) -> Self {
        ImageReference::new(picked.uri, picked.filename, picked.mime_type)
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

fn last_segment(uri: &str) -> Option<String> {
    let path = uri.split(['?', '#']).next().unwrap_or("");
    let path = path.split_once("://").map(|(_, rest)| rest).unwrap_or(path);
    // A bare authority ("http://host") has no file segment.
    if !path.contains(['/', '\\']) && uri.contains("://") {
        return None;
    }
    path.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let r = ImageReference::new(
            "file:///tmp/a.png",
            Some("seven.png".into()),
            Some("image/png".into()),
        );
        assert_eq!(r.filename, "seven.png");
        assert_eq!(r.mime_type, "image/png");
        assert_eq!(r.uri, "file:///tmp/a.png");
    }

    #[test]
    fn filename_falls_back_to_uri_segment() {
        let r = ImageReference::new("file:///var/mobile/IMG_0042.JPG?x=1", None, None);
        assert_eq!(r.filename, "IMG_0042.JPG");
        assert_eq!(r.mime_type, DEFAULT_MIME_TYPE);
    }

    #[test]
    fn defaults_when_nothing_is_known() {
        for uri in ["file:///photos/", "http://host", ""] {
            let r = ImageReference::new(uri, Some("  ".into()), Some(String::new()));
            assert_eq!(r.filename, DEFAULT_FILENAME, "uri: {uri}");
            assert_eq!(r.mime_type, DEFAULT_MIME_TYPE);
        }
    }
}
