//! Refinement domain
//!
//! Value objects and pure logic for the quality-convergence loop: quality
//! vectors, per-round records, final results, response-section parsing and
//! expansion validation. The loop itself lives in the application layer.

pub mod iteration;
pub mod parsing;
pub mod policy;
pub mod quality;
pub mod requirements;
pub mod result;
pub mod validation;

pub use iteration::IterationRecord;
pub use parsing::{SectionMarkers, SectionParseError};
pub use policy::{ExtractionFallback, RevisionPolicy};
pub use quality::QualityVector;
pub use requirements::SceneRequirements;
pub use result::{ExpansionOutcome, ExpansionRejection, ExpansionResult, RefinementResult, StopReason};
pub use validation::ExpansionValidator;
