pub mod client;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use client::{ApiClient, ApiError, ApiResult};
pub use runner::{Harness, RunOutcome};
pub use utils::config::HarnessConfig;
