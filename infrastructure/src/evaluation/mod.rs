//! Quality evaluators
//!
//! Adapters implementing [`QualityEvaluator`](stagecraft_application::QualityEvaluator).

mod heuristic;

pub use heuristic::{HEURISTIC_DIMENSIONS, HeuristicQualityEvaluator};
