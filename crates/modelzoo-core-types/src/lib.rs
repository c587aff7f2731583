//! Core types shared across ModelZoo facilities
//!
//! This crate provides foundational types used by the error, logging and
//! persistence layers:
//!
//! - **Correlation types**: RequestId for tying log lines of one save/load together
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::RequestId;
pub use sensitive::Sensitive;
