pub mod error;
pub mod fetch;
pub mod picker;
pub mod reference;

pub use error::SourceError;
pub use fetch::{file_uri, path_from_file_uri, ByteFetcher, UriFetcher};
pub use picker::{mime_from_path, ImagePicker, ImageSource, PathPicker, PickedImage};
pub use reference::{ImageReference, DEFAULT_FILENAME, DEFAULT_MIME_TYPE};
