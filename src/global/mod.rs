//! Per-user directories and the downloaded-artifact cache.

pub mod cache;
pub mod utils;
