//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod interaction_coordinator;
pub mod produce_scene;
pub mod refinement;
pub mod review_scene;
