//! JSON feedback package files
//!
//! A file holds either one [`ComprehensiveFeedback`] object or an array of
//! them. Scores are validated on load: a `quality_score` outside `[0, 1]`
//! rejects the file.

use serde::Deserialize;
use stagecraft_domain::ComprehensiveFeedback;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FeedbackFileError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid feedback package in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PackageDocument {
    Many(Vec<ComprehensiveFeedback>),
    One(Box<ComprehensiveFeedback>),
}

/// Parse the packages held in a JSON document.
pub fn parse_packages(json: &str) -> Result<Vec<ComprehensiveFeedback>, serde_json::Error> {
    Ok(match serde_json::from_str(json)? {
        PackageDocument::Many(packages) => packages,
        PackageDocument::One(package) => vec![*package],
    })
}

/// Load every package from the given files, in file order.
pub fn load_packages<P: AsRef<Path>>(
    paths: &[P],
) -> Result<Vec<ComprehensiveFeedback>, FeedbackFileError> {
    let mut packages = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FeedbackFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = parse_packages(&json).map_err(|source| FeedbackFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} feedback package(s) from {}", loaded.len(), path.display());
        packages.extend(loaded);
    }
    Ok(packages)
}
