//! # Precision Tiers
//!
//! Coarseness ranking of a resolved geometry. More specific tiers outrank
//! broader ones; `Unresolved` marks a hint that exhausted the chain and is
//! never stored in a service area.
//!
//! The coverage index partitions queries into three groups: specific
//! (`Exact`, `Postal`), broad (`Regional`, `Country`), and the `Global`
//! catch-all.

use serde::{Deserialize, Serialize};

/// The coarseness tier of a resolved geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// A structured match from the external geocoder.
    Exact,
    /// A postal-code boundary from the offline postal table.
    Postal,
    /// A sub-national region from the offline place table.
    Regional,
    /// A whole nation from the offline place table.
    Country,
    /// Whole-planet coverage (the `"everywhere"` sentinel).
    Global,
    /// The hint could not be resolved by any source.
    Unresolved,
}

/// The query-ordering group a tier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierGroup {
    /// Tested first: exact and postal geometries.
    Specific,
    /// Tested second: regional and country geometries.
    Broad,
    /// The catch-all, always last.
    Global,
}

impl Precision {
    /// Total order rank; lower is more specific.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Exact => 0,
            Self::Postal => 1,
            Self::Regional => 2,
            Self::Country => 3,
            Self::Global => 4,
            Self::Unresolved => 5,
        }
    }

    /// The query group this tier is tested in.
    ///
    /// `Unresolved` has no group in queries; it maps to the last group so
    /// a defensive caller still gets a total order.
    pub fn group(&self) -> TierGroup {
        match self {
            Self::Exact | Self::Postal => TierGroup::Specific,
            Self::Regional | Self::Country => TierGroup::Broad,
            Self::Global | Self::Unresolved => TierGroup::Global,
        }
    }

    /// Whether geometry at this tier may be stored in a service area.
    pub fn is_storable(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Exact => "exact",
            Self::Postal => "postal",
            Self::Regional => "regional",
            Self::Country => "country",
            Self::Global => "global",
            Self::Unresolved => "unresolved",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_is_total_and_specific_first() {
        assert!(Precision::Exact.rank() < Precision::Postal.rank());
        assert!(Precision::Postal.rank() < Precision::Regional.rank());
        assert!(Precision::Regional.rank() < Precision::Country.rank());
        assert!(Precision::Country.rank() < Precision::Global.rank());
        assert!(Precision::Global.rank() < Precision::Unresolved.rank());
    }

    #[test]
    fn test_grouping() {
        assert_eq!(Precision::Exact.group(), TierGroup::Specific);
        assert_eq!(Precision::Postal.group(), TierGroup::Specific);
        assert_eq!(Precision::Regional.group(), TierGroup::Broad);
        assert_eq!(Precision::Country.group(), TierGroup::Broad);
        assert_eq!(Precision::Global.group(), TierGroup::Global);
    }

    #[test]
    fn test_group_ordering() {
        assert!(TierGroup::Specific < TierGroup::Broad);
        assert!(TierGroup::Broad < TierGroup::Global);
    }

    #[test]
    fn test_unresolved_not_storable() {
        assert!(!Precision::Unresolved.is_storable());
        assert!(Precision::Postal.is_storable());
        assert!(Precision::Global.is_storable());
    }

    #[test]
    fn test_serde_wire_strings() {
        assert_eq!(serde_json::to_string(&Precision::Postal).unwrap(), "\"postal\"");
        let p: Precision = serde_json::from_str("\"global\"").unwrap();
        assert_eq!(p, Precision::Global);
    }
}
