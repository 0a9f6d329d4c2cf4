//! Unified error system for the Carton warehouse manager
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Consignment errors
//! - 5xxx: Master data errors
//! - 6xxx: Document errors
//! - 7xxx: Print errors
//! - 8xxx: Address book errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::NotFound);
//!
//! // Create an error with custom message
//! let err = AppError::with_message(ErrorCode::ValidationFailed, "Invalid quantity");
//!
//! // Create an error with details
//! let err = AppError::validation("SKUs missing from master data")
//!     .with_detail("missing", vec!["SKU-1".to_string()]);
//!
//! // Convert to API response
//! let response = ApiResponse::<()>::error(&err);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
