use super::domain::{ListingKey, LocationId};

/// Substrings that mark a key as derived data hanging off a listing.
const DERIVED_MARKERS: [&str; 5] = ["latitude", "longitude", "/downtown", "/poi/", "score"];

/// Computed scores written back next to each listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    DowntownCommute,
    CustomCommute,
    Total,
}

impl ScoreKind {
    pub const fn ordered() -> [Self; 3] {
        [Self::DowntownCommute, Self::CustomCommute, Self::Total]
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::DowntownCommute => "downtown_commute_score",
            Self::CustomCommute => "custom_commute_score",
            Self::Total => "total_score",
        }
    }
}

/// Key layout for one namespace:
///
/// ```text
/// <ns>:listings/<key>                         listing JSON
/// <ns>:listings/<key>/latitude|longitude      cached geocode
/// <ns>:listings/<key>/downtown                commute record vs downtown
/// <ns>:listings/<key>/poi/<poi-id>            commute record vs a POI
/// <ns>:listings/<key>/<kind>_score            numeric strings
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub fn new(namespace: &str) -> Self {
        Self {
            prefix: format!("{namespace}:listings/"),
        }
    }

    pub fn listings_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root(&self, key: &ListingKey) -> String {
        format!("{}{}", self.prefix, key.as_str())
    }

    pub fn latitude(&self, key: &ListingKey) -> String {
        format!("{}/latitude", self.root(key))
    }

    pub fn longitude(&self, key: &ListingKey) -> String {
        format!("{}/longitude", self.root(key))
    }

    pub fn downtown(&self, key: &ListingKey) -> String {
        format!("{}/downtown", self.root(key))
    }

    pub fn poi_prefix(&self, key: &ListingKey) -> String {
        format!("{}/poi/", self.root(key))
    }

    pub fn poi(&self, key: &ListingKey, poi: &LocationId) -> String {
        format!("{}{}", self.poi_prefix(key), poi.as_str())
    }

    pub fn score(&self, key: &ListingKey, kind: ScoreKind) -> String {
        format!("{}/{}", self.root(key), kind.suffix())
    }

    /// Returns the listing key when `raw` is a listing-root key, `None` for
    /// derived keys and keys outside this namespace.
    ///
    /// Classification is by substring, so a listing whose own id contains one
    /// of the marker words is never treated as a root.
    pub fn classify(&self, raw: &str) -> Option<ListingKey> {
        let rest = raw.strip_prefix(&self.prefix)?;
        if rest.is_empty() || DERIVED_MARKERS.iter().any(|marker| rest.contains(marker)) {
            return None;
        }
        Some(ListingKey::new(rest))
    }
}
