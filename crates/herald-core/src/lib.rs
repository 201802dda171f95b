//! # herald-core
//!
//! Core types and utilities for Herald.
//!
//! This crate provides the shared vocabulary used across all Herald crates:
//!
//! - **Types**: notification requests, per-channel responses, aggregated
//!   routing results, and delivery records
//! - **Errors**: pre-dispatch validation errors
//! - **Utilities**: delivery ID generation

pub mod error;
pub mod id;
pub mod types;

// Re-exports for convenience
pub use error::ValidationError;
pub use types::*;
