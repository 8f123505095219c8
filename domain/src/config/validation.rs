//! Configuration validation issues.
//!
//! Configuration sources produce a list of structured issues rather than
//! failing on the first problem, so every mistake in a config file can be
//! reported at once.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a default is used instead.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A threshold or score lies outside `[0, 1]`.
    ThresholdOutOfRange { field: String },
    /// `refinement.max_iterations` is 0.
    ZeroIterations,
    /// `scene.min_length` exceeds `scene.max_length`.
    LengthBoundsInverted,
    /// A string field does not name a known variant.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// `generator.timeout_secs` is 0.
    ZeroTimeout,
    /// `generator.temperature` lies outside `[0, 2]`.
    InvalidTemperature,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: IssueSeverity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}
