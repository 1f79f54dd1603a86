//! Staged order records
//!
//! Headers and lines are read from the staging tables as loose field maps:
//! column name to raw text value (or `None` for SQL NULL). The field layout
//! decides which columns are rendered and how.

use super::ids::ImportSetId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One staging row as a mapping of column name to raw value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: BTreeMap<String, Option<String>>,
}

impl Record {
    /// Creates an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.insert(name.into(), value);
    }

    /// Builder-style variant of [`Record::set`] for non-null values
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, Some(value.into()));
        self
    }

    /// Raw value of a field; `None` for missing fields and NULLs alike
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    /// Whether the record carries the column at all
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no columns
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, Some(v.into()));
        }
        record
    }
}

/// Export state of a staged header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFlag {
    /// Not yet exported (blank, `N`, or anything other than the sentinel)
    Pending,
    /// Flag equals the exported sentinel
    Exported,
}

impl ExportFlag {
    /// Interprets a raw flag column value against the configured sentinel
    pub fn from_raw(raw: Option<&str>, sentinel: &str) -> Self {
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() && value == sentinel.trim() => ExportFlag::Exported,
            _ => ExportFlag::Pending,
        }
    }

    /// Whether the header still needs exporting
    pub fn is_pending(&self) -> bool {
        matches!(self, ExportFlag::Pending)
    }
}

/// Staged order header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Import set the header belongs to
    pub import_set: ImportSetId,

    /// Current export flag
    pub flag: ExportFlag,

    /// Raw column values
    pub record: Record,
}

/// Staged order line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Import set the line belongs to
    pub import_set: ImportSetId,

    /// Raw line number as stored
    pub line_no: Option<String>,

    /// Raw column values
    pub record: Record,
}

/// Orders two raw line numbers
///
/// Numeric values compare numerically and come first, non-numeric values
/// compare as text, missing values go last.
pub fn compare_line_numbers(a: Option<&str>, b: Option<&str>) -> Ordering {
    let parse = |v: &str| v.trim().parse::<f64>().ok().filter(|n| n.is_finite());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match (parse(x), parse(y)) {
            (Some(nx), Some(ny)) => nx.partial_cmp(&ny).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => x.cmp(y),
        },
    }
}

/// Sorts lines by line number, keeping staging order for ties
pub fn sort_lines(lines: &mut [Line]) {
    lines.sort_by(|a, b| compare_line_numbers(a.line_no.as_deref(), b.line_no.as_deref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(no: Option<&str>, item: &str) -> Line {
        Line {
            import_set: ImportSetId::new("1").unwrap(),
            line_no: no.map(str::to_string),
            record: Record::new().with("Item_ID", item),
        }
    }

    #[test]
    fn test_record_get_and_null() {
        let mut record = Record::new().with("Customer_ID", "100");
        record.set("Taker", None);

        assert_eq!(record.get("Customer_ID"), Some("100"));
        assert_eq!(record.get("Taker"), None);
        assert!(record.contains("Taker"));
        assert!(!record.contains("Missing"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_export_flag_from_raw() {
        assert_eq!(ExportFlag::from_raw(Some("Y"), "Y"), ExportFlag::Exported);
        assert_eq!(ExportFlag::from_raw(Some(" Y "), "Y"), ExportFlag::Exported);
        assert_eq!(ExportFlag::from_raw(Some("N"), "Y"), ExportFlag::Pending);
        assert_eq!(ExportFlag::from_raw(Some("  "), "Y"), ExportFlag::Pending);
        assert_eq!(ExportFlag::from_raw(None, "Y"), ExportFlag::Pending);
        assert_eq!(ExportFlag::from_raw(Some("y"), "Y"), ExportFlag::Pending);
    }

    #[test]
    fn test_sort_lines_numeric() {
        let mut lines = vec![line(Some("10"), "c"), line(Some("2"), "b"), line(Some("1"), "a")];
        sort_lines(&mut lines);
        let items: Vec<_> = lines.iter().map(|l| l.record.get("Item_ID").unwrap()).collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_lines_mixed_does_not_panic() {
        let mut lines = vec![
            line(Some("x"), "d"),
            line(None, "e"),
            line(Some("2.00"), "b"),
            line(Some("abc"), "c"),
            line(Some("1"), "a"),
        ];
        sort_lines(&mut lines);
        let items: Vec<_> = lines.iter().map(|l| l.record.get("Item_ID").unwrap()).collect();
        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_sort_lines_stable_for_ties() {
        let mut lines = vec![line(Some("1"), "first"), line(Some("1.0"), "second")];
        sort_lines(&mut lines);
        assert_eq!(lines[0].record.get("Item_ID"), Some("first"));
    }
}
