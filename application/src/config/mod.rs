//! Application configuration
//!
//! Parameters that control the refinement and expansion loops. These are
//! application-layer concerns, not domain policy.

mod refinement_params;

pub use refinement_params::{ExpansionParams, RefinementParams};
