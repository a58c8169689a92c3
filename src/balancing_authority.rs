//! Balancing authorities are the grid operators used as the geographic key for regional
//! attribution.
use indexmap::IndexMap;

/// A map of [`BalancingAuthority`]s, keyed by BA code
pub type BalancingAuthorityMap = IndexMap<String, BalancingAuthority>;

/// Reference data for a single balancing authority
#[derive(Debug, Clone, PartialEq)]
pub struct BalancingAuthority {
    /// Short code (e.g. "CISO")
    pub code: String,
    /// Full name
    pub name: String,
    /// FERC region the authority belongs to
    pub ferc_region: Option<String>,
    /// EIA region the authority belongs to
    pub eia_region: Option<String>,
}
