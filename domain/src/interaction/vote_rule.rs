//! Vote rules for settling conflicting positions
//!
//! The leading position among a thread's conflict messages carries the vote
//! once its backing reaches the bar set by the rule.

use serde::{Deserialize, Serialize};

/// Bar the leading position must clear
///
/// ```
/// use stagecraft_domain::interaction::VoteRule;
///
/// assert_eq!(VoteRule::Majority.required_votes(4), 3);
/// assert_eq!(VoteRule::Share(60).required_votes(5), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoteRule {
    /// Strictly more than half of the conflicting agents
    #[default]
    Majority,
    /// Every conflicting agent
    Unanimous,
    /// At least this percentage of the conflicting agents, rounded up
    Share(u8),
}

impl VoteRule {
    /// Votes needed out of `total` conflicting messages.
    pub fn required_votes(&self, total: usize) -> usize {
        match self {
            VoteRule::Majority => total / 2 + 1,
            VoteRule::Unanimous => total,
            VoteRule::Share(percent) => (total * usize::from(*percent)).div_ceil(100),
        }
    }

    /// Whether `votes` of `total` carries the vote; an empty panel never does.
    pub fn is_satisfied(&self, votes: usize, total: usize) -> bool {
        total > 0 && votes >= self.required_votes(total).max(1)
    }
}

impl std::fmt::Display for VoteRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteRule::Majority => write!(f, "majority"),
            VoteRule::Unanimous => write!(f, "unanimous"),
            VoteRule::Share(percent) => write!(f, "{percent}%"),
        }
    }
}

impl std::str::FromStr for VoteRule {
    type Err = String;

    /// Accepts `majority`, `unanimous`, `share:N` or `N%`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule = s.trim().to_lowercase();
        match rule.as_str() {
            "majority" => return Ok(VoteRule::Majority),
            "unanimous" => return Ok(VoteRule::Unanimous),
            _ => {}
        }

        let percent = rule
            .strip_prefix("share:")
            .or_else(|| rule.strip_suffix('%'))
            .ok_or_else(|| {
                format!("Unknown vote rule: {s}. Valid: majority, unanimous, share:N or N%")
            })?;
        match percent.trim().parse::<u8>() {
            Ok(p) if (1..=100).contains(&p) => Ok(VoteRule::Share(p)),
            _ => Err(format!("Vote share must be 1-100, got '{}'", percent.trim())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_needs_more_than_half() {
        let rule = VoteRule::Majority;
        assert!(!rule.is_satisfied(1, 3));
        assert!(rule.is_satisfied(2, 3));
        assert!(!rule.is_satisfied(2, 4));
        assert!(rule.is_satisfied(3, 4));
        assert!(rule.is_satisfied(1, 1));
    }

    #[test]
    fn test_unanimous_and_share() {
        assert!(VoteRule::Unanimous.is_satisfied(3, 3));
        assert!(!VoteRule::Unanimous.is_satisfied(2, 3));
        assert!(!VoteRule::Share(75).is_satisfied(3, 5));
        assert!(VoteRule::Share(75).is_satisfied(4, 5));
        assert!(VoteRule::Share(30).is_satisfied(1, 3));
    }

    #[test]
    fn test_empty_panel_never_carries() {
        assert!(!VoteRule::Majority.is_satisfied(0, 0));
        assert!(!VoteRule::Share(1).is_satisfied(0, 0));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Majority".parse::<VoteRule>(), Ok(VoteRule::Majority));
        assert_eq!("share:60".parse::<VoteRule>(), Ok(VoteRule::Share(60)));
        assert_eq!("75%".parse::<VoteRule>(), Ok(VoteRule::Share(75)));
        assert!("150%".parse::<VoteRule>().is_err());
        assert!("0%".parse::<VoteRule>().is_err());
        assert!("plurality".parse::<VoteRule>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for rule in [VoteRule::Majority, VoteRule::Unanimous, VoteRule::Share(40)] {
            assert_eq!(rule.to_string().parse::<VoteRule>(), Ok(rule));
        }
    }
}
