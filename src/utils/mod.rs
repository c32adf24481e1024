pub mod logging;

pub use logging::{redact_secrets, truncate_text};
