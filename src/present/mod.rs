pub mod presenter;

pub use presenter::{alert_for, caption_for, Alert, Caption, ALERT_TITLE, FALLBACK_MESSAGE};
