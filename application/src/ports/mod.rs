//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod content_generator;
pub mod progress;
pub mod quality_evaluator;
pub mod scene_reviewer;
