//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Scene content cannot be empty")]
    EmptyContent,

    #[error("Score out of range for {field}: {value} (expected 0.0..=1.0)")]
    ScoreOutOfRange { field: &'static str, value: f64 },
}

/// Validate that a score lies in the closed unit interval.
pub fn ensure_unit_score(field: &'static str, value: f64) -> Result<f64, DomainError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DomainError::ScoreOutOfRange { field, value })
    }
}

/// Reject scene text that is empty or whitespace only.
pub fn ensure_scene_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        Err(DomainError::EmptyContent)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_unit_score() {
        assert_eq!(ensure_unit_score("quality_score", 0.0), Ok(0.0));
        assert_eq!(ensure_unit_score("quality_score", 1.0), Ok(1.0));

        let err = ensure_unit_score("quality_score", 1.2).unwrap_err();
        assert!(err.to_string().contains("quality_score"));
        assert!(ensure_unit_score("quality_score", f64::NAN).is_err());
    }

    #[test]
    fn test_whitespace_scene_is_empty() {
        assert_eq!(ensure_scene_content(" \n\t"), Err(DomainError::EmptyContent));
        assert_eq!(ensure_scene_content("HAMLET: Hm."), Ok(()));
    }
}
