pub mod config;
pub mod error;
pub mod http;
pub mod multipart;
pub mod predict;
pub mod result;

pub use config::ClientConfig;
pub use error::{ConfigError, RequestError};
pub use predict::PredictionClient;
pub use result::{PredictionResult, CLASS_COUNT};
