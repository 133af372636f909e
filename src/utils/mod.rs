// Gateway module for utilities

mod errors;
mod logger;

pub use errors::PatouError;
pub use logger::init_logger;

/// Crate-wide result alias for fallible API and controller operations
pub type Result<T> = std::result::Result<T, PatouError>;
