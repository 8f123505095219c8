//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`text`] — UTF-8 safe truncation and scene text scanning helpers

pub mod error;
pub mod text;
