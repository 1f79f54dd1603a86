//! Domain identifier types with validation
//!
//! Import sets are keyed by an opaque textual id. It is numeric in practice,
//! so listings order numerically first and fall back to text order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Import set identifier newtype wrapper
///
/// Groups one staged header with its lines. Carried exactly as stored in the
/// staging tables (no trimming or padding) so lookups hit the same rows.
///
/// # Examples
///
/// ```
/// use order_export::domain::ids::ImportSetId;
/// use std::str::FromStr;
///
/// let id = ImportSetId::from_str("7").unwrap();
/// assert_eq!(id.as_str(), "7");
/// assert_eq!(id.zero_padded(4), "0007");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportSetId(String);

impl ImportSetId {
    /// Creates a new ImportSetId from a string
    ///
    /// # Returns
    ///
    /// Returns `Err` if the id is empty or whitespace only
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Import set ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the import set ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Integer value of the id, if it has one
    pub fn numeric_value(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }

    /// Left-pads the trimmed id with zeros up to `width` characters
    pub fn zero_padded(&self, width: usize) -> String {
        let trimmed = self.0.trim();
        format!("{trimmed:0>width$}")
    }

    /// Listing order: numeric ids ascending, then non-numeric ids lexically
    pub fn listing_order(&self, other: &Self) -> Ordering {
        match (self.numeric_value(), other.numeric_value()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl fmt::Display for ImportSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ImportSetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ImportSetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds the ordered, de-duplicated pending list from raw staging values
///
/// Blank and missing values are dropped.
pub fn pending_ids_from_raw<I>(raw: I) -> Vec<ImportSetId>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut ids: Vec<ImportSetId> = raw
        .into_iter()
        .flatten()
        .filter_map(|value| ImportSetId::new(value).ok())
        .collect();
    ids.sort_by(|a, b| a.listing_order(b));
    ids.dedup();
    ids
}
