//! Feedback package sources
//!
//! Reviewer packages stored as JSON files, and a [`SceneReviewer`] that
//! replays them.
//!
//! [`SceneReviewer`]: stagecraft_application::SceneReviewer

mod package_file;
mod static_reviewer;

pub use package_file::{FeedbackFileError, load_packages, parse_packages};
pub use static_reviewer::StaticReviewer;
