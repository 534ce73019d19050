use serde::{Deserialize, Serialize};

/// Star count stored when the count could not be determined.
pub const STARS_UNKNOWN: i64 = -1;

/// A search-result dataset: the project entries plus the search's total hit count.
///
/// Entry order is significant and preserved from input to output. `total` is
/// carried through untouched; it is the upstream search total, not
/// necessarily `results.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub results: Vec<Entry>,
    #[serde(default)]
    pub total: i64,
}

/// One project record.
///
/// Fields absent from the input decode to their defaults; the output always
/// carries all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// Project identifier, usually "owner/repo".
    pub name: String,
    /// Project page URL. May be empty or relative on input; absolute after enrichment.
    pub url: String,
    pub description: String,
    pub tags: Vec<String>,
    pub score: f64,
    /// Star count, or [`STARS_UNKNOWN`].
    pub stars: i64,
}

impl Dataset {
    /// Decode a dataset from its JSON representation.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Encode as JSON indented with a two-space step.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl Entry {
    pub fn mark_unknown(&mut self) {
        self.stars = STARS_UNKNOWN;
    }

    pub fn has_known_stars(&self) -> bool {
        self.stars >= 0
    }
}
