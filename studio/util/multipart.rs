/// A file part pulled out of a `multipart/form-data` upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Splits `haystack` on every occurrence of `needle`.
fn split_on<'a>(haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut result = Vec::new();
    let mut start = 0;
    while start <= haystack.len() {
        if let Some(pos) = find_subsequence(&haystack[start..], needle) {
            result.push(&haystack[start..start + pos]);
            start += pos + needle.len();
        } else {
            result.push(&haystack[start..]);
            break;
        }
    }
    result
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(|s| s.trim())
        .find(|s| s.starts_with("boundary="))
        .map(|s| s["boundary=".len()..].trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// Finds the file part uploaded under `field_name`.
///
/// Returns `None` when the field is missing or the browser sent it without a
/// filename (nothing was chosen).
pub fn extract_file_part(body: &[u8], boundary: &str, field_name: &str) -> Option<FilePart> {
    let delimiter = format!("--{}", boundary);
    let sep = b"\r\n\r\n";

    for part in split_on(body, delimiter.as_bytes()) {
        let Some(sep_pos) = find_subsequence(part, sep) else {
            continue;
        };
        let headers = String::from_utf8_lossy(&part[..sep_pos]);

        let mut name = None;
        let mut filename = None;
        let mut content_type = None;
        for line in headers.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("Content-Disposition") {
                name = disposition_param(value, "name");
                filename = disposition_param(value, "filename");
            } else if key.trim().eq_ignore_ascii_case("Content-Type") {
                content_type = Some(value.trim().to_owned()).filter(|v| !v.is_empty());
            }
        }

        if name.as_deref() != Some(field_name) {
            continue;
        }
        let filename = filename.filter(|f| !f.is_empty())?;
        let raw = &part[sep_pos + sep.len()..];
        let data = raw.strip_suffix(b"\r\n").unwrap_or(raw).to_vec();
        return Some(FilePart { filename, content_type, data });
    }
    None
}

/// Reads `key="value"` (or `key=value`) out of a Content-Disposition value.
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition
        .split(';')
        .map(|s| s.trim())
        .find_map(|param| {
            let (k, v) = param.split_once('=')?;
            if k.trim().eq_ignore_ascii_case(key) {
                Some(v.trim().trim_matches('"').to_owned())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----WebKitFormBoundaryabc";

    fn body(parts: &[&str]) -> Vec<u8> {
        let mut out = String::new();
        for p in parts {
            out.push_str(&format!("--{}\r\n{}\r\n", BOUNDARY, p));
        }
        out.push_str(&format!("--{}--\r\n", BOUNDARY));
        out.into_bytes()
    }

    #[test]
    fn boundary_from_content_type() {
        assert_eq!(
            extract_boundary("multipart/form-data; boundary=\"xyz\"").as_deref(),
            Some("xyz")
        );
        assert_eq!(extract_boundary("multipart/form-data"), None);
    }

    #[test]
    fn extracts_named_file_part() {
        let b = body(&[
            "Content-Disposition: form-data; name=\"note\"\r\n\r\nhello",
            "Content-Disposition: form-data; name=\"image\"; filename=\"seven.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA",
        ]);
        let part = extract_file_part(&b, BOUNDARY, "image").unwrap();
        assert_eq!(part.filename, "seven.png");
        assert_eq!(part.content_type.as_deref(), Some("image/png"));
        assert_eq!(part.data, b"PNGDATA");
    }

    #[test]
    fn empty_file_input_is_none() {
        let b = body(&[
            "Content-Disposition: form-data; name=\"image\"; filename=\"\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        ]);
        assert_eq!(extract_file_part(&b, BOUNDARY, "image"), None);
        assert_eq!(extract_file_part(&b, BOUNDARY, "other"), None);
    }
}
