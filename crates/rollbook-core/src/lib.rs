//! # Rollbook Core
//!
//! Core types for the Rollbook services.
//!
//! This crate provides the foundational types used throughout the Rollbook
//! application:
//!
//! - [`errors`]: Application error type carrying an HTTP status code
//! - [`response`]: The outbound response envelope every operation produces
//!
//! # Example
//!
//! ```ignore
//! use rollbook_core::{ApiResponse, AppError};
//!
//! let err = AppError::not_found(anyhow::anyhow!("Student not found"));
//! let resp = ApiResponse::from_app_error(&err, "An error occurred while getting student");
//! assert_eq!(resp.code, 404);
//! ```

pub mod errors;
pub mod response;

pub use errors::AppError;
pub use response::ApiResponse;
