//! Registry Console common utilities.

pub mod logging;

pub use logging::{init_logging, LogFormat};
