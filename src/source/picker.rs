use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::source::error::SourceError;
use crate::source::fetch::file_uri;
use crate::source::reference::ImageReference;

/// What a picker hands back. Missing fields are defaulted by `ImageReference`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PickedImage {
    pub uri: String,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
}

/// A "let the user choose a picture" capability.
///
/// `Ok(None)` means the user cancelled; that is not an error.
pub trait ImagePicker {
    fn pick(&mut self) -> Result<Option<PickedImage>, SourceError>;
}

/// Holds the currently selected image, if any.
#[derive(Debug, Default)]
pub struct ImageSource {
    current: Option<ImageReference>,
}

impl ImageSource {
    pub fn new() -> ImageSource {
        ImageSource { current: None }
    }

    /// Runs `picker` once. A cancellation leaves the current selection as is.
    ///
    /// Returns `true` when a new image replaced the selection.
    pub fn pick(&mut self, picker: &mut dyn ImagePicker) -> Result<bool, SourceError> {
        match picker.pick()? {
            Some(picked) => {
                let reference = ImageReference::from(picked);
                info!("picked image '{}' ({})", reference.filename, reference.mime_type);
                self.current = Some(reference);
                Ok(true)
            }
            None => {
                debug!("image pick cancelled");
                Ok(false)
            }
        }
    }

    /// Back to "no image selected".
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&ImageReference> {
        self.current.as_ref()
    }
}

/// Picks a file already chosen on the filesystem (command line, drag and drop).
/// `None` as the path behaves like a cancelled dialog.
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    path: Option<PathBuf>,
    filename: Option<String>,
    mime_type: Option<String>,
}

impl PathPicker {
    pub fn new(path: Option<PathBuf>) -> PathPicker {
        PathPicker { path, filename: None, mime_type: None }
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }
}

impl ImagePicker for PathPicker {
    fn pick(&mut self) -> Result<Option<PickedImage>, SourceError> {
        let Some(path) = self.path.take() else {
            return Ok(None);
        };
        let abs = path
            .canonicalize()
            .map_err(|source| SourceError::Read { path: path.clone(), source })?;
        let mime_type = self.mime_type.take().or_else(|| mime_from_path(&abs));
        Ok(Some(PickedImage {
            uri: file_uri(&abs),
            filename: self.filename.take(),
            mime_type,
        }))
    }
}

/// Infers a MIME type from the file extension, for the formats `image` knows.
pub fn mime_from_path(path: &Path) -> Option<String> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type().to_owned())
}
