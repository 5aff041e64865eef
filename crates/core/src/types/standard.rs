//! Listing quality standard.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Tiered quality classification of a listing.
///
/// Ordered Bronze < Silver < Gold. Serialized as the capitalized tier name,
/// matching the backend's `standard` column values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Standard {
    #[default]
    Bronze,
    Silver,
    Gold,
}

impl Standard {
    /// All standards, in ascending order.
    pub const ALL: [Self; 3] = [Self::Bronze, Self::Silver, Self::Gold];

    /// The tier name as stored in the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }
}

impl fmt::Display for Standard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Standard {
    type Err = UnknownStandard;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bronze" => Ok(Self::Bronze),
            "Silver" => Ok(Self::Silver),
            "Gold" => Ok(Self::Gold),
            other => Err(UnknownStandard(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized standard value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown standard: {0}")]
pub struct UnknownStandard(String);

/// Standard filter applied to the listing grid.
///
/// `All` disables standard filtering; a specific tier restricts the view to
/// listings with exactly that standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StandardFilter {
    #[default]
    All,
    Only(Standard),
}

impl StandardFilter {
    /// Whether a listing with the given standard passes this filter.
    #[must_use]
    pub fn matches(self, standard: Standard) -> bool {
        match self {
            Self::All => true,
            Self::Only(s) => s == standard,
        }
    }

    /// Parse a filter from a query value; anything that is not a known tier
    /// (including "All") means no filtering.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        s.parse::<Standard>().map_or(Self::All, Self::Only)
    }
}

impl fmt::Display for StandardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(s) => f.write_str(s.as_str()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Standard::Bronze < Standard::Silver);
        assert!(Standard::Silver < Standard::Gold);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Gold".parse::<Standard>().unwrap(), Standard::Gold);
        assert!("gold".parse::<Standard>().is_err());
        assert!("Platinum".parse::<Standard>().is_err());
    }

    #[test]
    fn test_serde_uses_tier_name() {
        let json = serde_json::to_string(&Standard::Silver).unwrap();
        assert_eq!(json, "\"Silver\"");
        let parsed: Standard = serde_json::from_str("\"Bronze\"").unwrap();
        assert_eq!(parsed, Standard::Bronze);
    }

    #[test]
    fn test_filter_all_matches_everything() {
        for s in Standard::ALL {
            assert!(StandardFilter::All.matches(s));
        }
    }

    #[test]
    fn test_filter_only_matches_exactly() {
        let filter = StandardFilter::Only(Standard::Gold);
        assert!(filter.matches(Standard::Gold));
        assert!(!filter.matches(Standard::Silver));
        assert!(!filter.matches(Standard::Bronze));
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(StandardFilter::parse("All"), StandardFilter::All);
        assert_eq!(
            StandardFilter::parse("Gold"),
            StandardFilter::Only(Standard::Gold)
        );
        assert_eq!(StandardFilter::parse("nonsense"), StandardFilter::All);
    }
}
