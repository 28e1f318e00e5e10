//! Utility functions for string formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{mask_password, truncate_string};
