//! Shared types for the Carton warehouse manager
//!
//! Common types used across the server and printer crates: domain models,
//! error types and the unified API response structure.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
