//! Quality vectors - named scores produced by a quality evaluator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scores for a fixed, evaluator-defined set of quality dimensions.
///
/// Dimensions are kept ordered by name, so iteration, display and tie-breaks
/// are deterministic. Every score is clamped into `0.0..=1.0` on insertion.
///
/// # Example
///
/// ```
/// use stagecraft_domain::refinement::QualityVector;
///
/// let scores = QualityVector::from_pairs([("dialogue", 0.5), ("pacing", 0.4), ("character", 0.6)]);
/// assert!((scores.mean() - 0.5).abs() < 1e-9);
/// assert_eq!(scores.lowest(2), vec!["pacing", "dialogue"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityVector(BTreeMap<String, f64>);

impl QualityVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector from `(dimension, score)` pairs.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut vector = Self::new();
        for (name, score) in pairs {
            vector.insert(name, score);
        }
        vector
    }

    /// Set a dimension's score, clamped into the unit interval.
    pub fn insert(&mut self, dimension: impl Into<String>, score: f64) {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        self.0.insert(dimension.into(), score);
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.0.get(dimension).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Arithmetic mean of all scores (0.0 when empty).
    pub fn mean(&self) -> f64 {
        mean_of(self.0.values().copied())
    }

    /// Per-dimension change from `previous` to `self`.
    ///
    /// Dimensions missing from `previous` are treated as having scored 0.0.
    /// The result is not clamped: deltas are signed.
    pub fn delta_from(&self, previous: &QualityVector) -> BTreeMap<String, f64> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v - previous.get(k).unwrap_or(0.0)))
            .collect()
    }

    /// Names of the `n` lowest-scoring dimensions, ascending by score.
    pub fn lowest(&self, n: usize) -> Vec<String> {
        smallest_keys(&self.0, n)
    }
}

/// Mean of an iterator of floats, 0.0 when it is empty.
pub fn mean_of(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Keys of the `n` smallest values, ascending by value then by key.
pub(crate) fn smallest_keys(map: &BTreeMap<String, f64>, n: usize) -> Vec<String> {
    let mut entries: Vec<(&String, f64)> = map.iter().map(|(k, v)| (k, *v)).collect();
    // BTreeMap iteration is already name-ordered and the sort is stable
    entries.sort_by(|a, b| a.1.total_cmp(&b.1));
    entries
        .into_iter()
        .take(n)
        .map(|(k, _)| k.clone())
        .collect()
}

impl std::fmt::Display for QualityVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v:.2}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for QualityVector {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(QualityVector::new().mean(), 0.0);
        assert_eq!(mean_of(Vec::<f64>::new()), 0.0);
    }

    #[test]
    fn test_insert_clamps() {
        let v = QualityVector::from_pairs([("a", 1.4), ("b", -0.2), ("c", f64::NAN)]);
        assert_eq!(v.get("a"), Some(1.0));
        assert_eq!(v.get("b"), Some(0.0));
        assert_eq!(v.get("c"), Some(0.0));
    }

    #[test]
    fn test_delta_from() {
        let before = QualityVector::from_pairs([("dialogue", 0.5), ("pacing", 0.4)]);
        let after = QualityVector::from_pairs([("dialogue", 0.7), ("pacing", 0.3), ("tone", 0.2)]);
        let delta = after.delta_from(&before);

        assert!((delta["dialogue"] - 0.2).abs() < 1e-9);
        assert!((delta["pacing"] + 0.1).abs() < 1e-9);
        assert!((delta["tone"] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_lowest_breaks_ties_by_name() {
        let v = QualityVector::from_pairs([("zeta", 0.3), ("alpha", 0.3), ("mid", 0.5), ("low", 0.1)]);
        assert_eq!(v.lowest(3), vec!["low", "alpha", "zeta"]);
        assert_eq!(v.lowest(10).len(), 4);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let v = QualityVector::from_pairs([("pacing", 0.5)]);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"pacing":0.5}"#);

        let back: QualityVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_display() {
        let v = QualityVector::from_pairs([("b", 0.25), ("a", 0.5)]);
        assert_eq!(v.to_string(), "a=0.50, b=0.25");
    }
}
