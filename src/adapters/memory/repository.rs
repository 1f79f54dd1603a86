//! In-memory staging repository
//!
//! Keeps staged rows in insertion order behind a mutex. Used for tests and
//! local dry runs, and can be seeded from a JSON file of the form
//! `{"headers": [{..}], "lines": [{..}]}` where each row is a column map.

use crate::adapters::database::traits::ImportSetRepository;
use crate::config::schema::StagingConfig;
use crate::domain::ids::pending_ids_from_raw;
use crate::domain::order::sort_lines;
use crate::domain::{ExportFlag, Header, ImportSetId, Line, OrderExportError, Record, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    /// `test_connection`
    Connection,
    /// `list_pending_import_sets`
    ListPending,
    /// `fetch_header`
    FetchHeader,
    /// `fetch_lines`
    FetchLines,
    /// `mark_exported`
    MarkExported,
}

#[derive(Debug, Default)]
struct Tables {
    headers: Vec<Record>,
    lines: Vec<Record>,
    failures: HashSet<(FailurePoint, Option<String>)>,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    headers: Vec<BTreeMap<String, Value>>,
    #[serde(default)]
    lines: Vec<BTreeMap<String, Value>>,
}

fn record_from_json(row: BTreeMap<String, Value>) -> Record {
    let mut record = Record::new();
    for (column, value) in row {
        let text = match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            Value::Bool(b) => Some(if b { "Y" } else { "N" }.to_string()),
            other => Some(other.to_string()),
        };
        record.set(column, text);
    }
    record
}

/// Staging tables held in process memory
#[derive(Debug)]
pub struct InMemoryRepository {
    staging: StagingConfig,
    tables: Mutex<Tables>,
    mark_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl InMemoryRepository {
    /// Empty repository using the given column names
    pub fn new(staging: StagingConfig) -> Self {
        Self {
            staging,
            tables: Mutex::new(Tables::default()),
            mark_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Repository seeded from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid seed JSON.
    pub fn from_seed_file(staging: StagingConfig, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OrderExportError::Configuration(format!(
                "Failed to read seed file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_seed_json(staging, &contents)
    }

    /// Repository seeded from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid seed JSON.
    pub fn from_seed_json(staging: StagingConfig, json: &str) -> Result<Self> {
        let seed: SeedFile = serde_json::from_str(json)?;
        let repository = Self::new(staging);
        for row in seed.headers {
            repository.insert_header(record_from_json(row));
        }
        for row in seed.lines {
            repository.insert_line(record_from_json(row));
        }
        Ok(repository)
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // a poisoned lock only means a test panicked mid-update
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends a header row
    pub fn insert_header(&self, record: Record) {
        self.tables().headers.push(record);
    }

    /// Appends a line row
    pub fn insert_line(&self, record: Record) {
        self.tables().lines.push(record);
    }

    /// Makes an operation fail, for one id or (with `None`) for all
    pub fn fail(&self, point: FailurePoint, import_set: Option<&str>) {
        self.tables()
            .failures
            .insert((point, import_set.map(str::to_string)));
    }

    /// Removes all injected failures
    pub fn clear_failures(&self) {
        self.tables().failures.clear();
    }

    /// Number of `mark_exported` calls, successful or not
    pub fn mark_calls(&self) -> usize {
        self.mark_calls.load(Ordering::SeqCst)
    }

    /// Number of pending listings, one per cycle that reached the store
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Current flag value of the first header for an id
    pub fn flag_of(&self, import_set: &str) -> Option<String> {
        let tables = self.tables();
        tables
            .headers
            .iter()
            .find(|h| h.get(&self.staging.header_id_column) == Some(import_set))
            .and_then(|h| h.get(&self.staging.flag_column).map(str::to_string))
    }

    fn check(&self, point: FailurePoint, import_set: Option<&ImportSetId>) -> Result<()> {
        let tables = self.tables();
        let hit = tables.failures.contains(&(point, None))
            || import_set.is_some_and(|id| {
                tables
                    .failures
                    .contains(&(point, Some(id.as_str().to_string())))
            });

        if !hit {
            return Ok(());
        }

        let message = format!("Injected {point:?} failure");
        Err(match point {
            FailurePoint::Connection => OrderExportError::Connection(message),
            FailurePoint::MarkExported => OrderExportError::State(message),
            _ => OrderExportError::Database(message),
        })
    }

    fn exported_value(&self) -> &str {
        self.staging.exported_value.trim()
    }
}

#[async_trait]
impl ImportSetRepository for InMemoryRepository {
    async fn test_connection(&self) -> Result<()> {
        self.check(FailurePoint::Connection, None)
    }

    async fn list_pending_import_sets(&self) -> Result<Vec<ImportSetId>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check(FailurePoint::ListPending, None)?;

        let tables = self.tables();
        let raw = tables
            .headers
            .iter()
            .filter(|h| {
                ExportFlag::from_raw(h.get(&self.staging.flag_column), self.exported_value())
                    .is_pending()
            })
            .map(|h| h.get(&self.staging.header_id_column).map(str::to_string))
            .collect::<Vec<_>>();

        Ok(pending_ids_from_raw(raw))
    }

    async fn fetch_header(&self, id: &ImportSetId) -> Result<Option<Header>> {
        self.check(FailurePoint::FetchHeader, Some(id))?;

        let tables = self.tables();
        let mut matching = tables
            .headers
            .iter()
            .filter(|h| h.get(&self.staging.header_id_column) == Some(id.as_str()));

        let Some(record) = matching.next() else {
            return Ok(None);
        };

        let extra = matching.count();
        if extra > 0 {
            tracing::warn!(
                import_set = %id,
                rows = extra + 1,
                "Multiple header rows staged for import set; using the first"
            );
        }

        Ok(Some(Header {
            import_set: id.clone(),
            flag: ExportFlag::from_raw(record.get(&self.staging.flag_column), self.exported_value()),
            record: record.clone(),
        }))
    }

    async fn fetch_lines(&self, id: &ImportSetId) -> Result<Vec<Line>> {
        self.check(FailurePoint::FetchLines, Some(id))?;

        let tables = self.tables();
        let mut lines: Vec<Line> = tables
            .lines
            .iter()
            .filter(|l| l.get(&self.staging.line_id_column) == Some(id.as_str()))
            .map(|record| Line {
                import_set: id.clone(),
                line_no: record
                    .get(&self.staging.line_number_column)
                    .map(str::to_string),
                record: record.clone(),
            })
            .collect();
        sort_lines(&mut lines);
        Ok(lines)
    }

    async fn mark_exported(&self, id: &ImportSetId) -> Result<u64> {
        self.mark_calls.fetch_add(1, Ordering::SeqCst);
        self.check(FailurePoint::MarkExported, Some(id))?;

        let sentinel = self.exported_value().to_string();
        let mut tables = self.tables();
        let mut updated = 0;
        for header in tables
            .headers
            .iter_mut()
            .filter(|h| h.get(&self.staging.header_id_column) == Some(id.as_str()))
        {
            header.set(self.staging.flag_column.clone(), Some(sentinel.clone()));
            updated += 1;
        }

        if updated == 0 {
            return Err(OrderExportError::State(format!(
                "No header row flagged for import set {id}"
            )));
        }
        Ok(updated)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> InMemoryRepository {
        InMemoryRepository::new(StagingConfig::default())
    }

    fn header(id: &str, flag: Option<&str>, customer: &str) -> Record {
        let mut record = Record::new()
            .with("Import_Set_No", id)
            .with("Customer_ID", customer);
        record.set("Exported", flag.map(str::to_string));
        record
    }

    fn line(id: &str, no: &str, item: &str) -> Record {
        Record::new()
            .with("Import_Set_Number", id)
            .with("Line_No", no)
            .with("Item_ID", item)
    }

    fn id(value: &str) -> ImportSetId {
        ImportSetId::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_list_pending_filters_exported() {
        let repo = repo();
        repo.insert_header(header("10", None, "A"));
        repo.insert_header(header("2", Some(" "), "B"));
        repo.insert_header(header("3", Some("Y"), "C"));
        repo.insert_header(header("4", Some("N"), "D"));
        repo.insert_header(header(" ", None, "E"));

        let pending = repo.list_pending_import_sets().await.unwrap();
        let values: Vec<&str> = pending.iter().map(|i| i.as_str()).collect();
        assert_eq!(values, vec!["2", "4", "10"]);
    }

    #[tokio::test]
    async fn test_fetch_header_first_wins() {
        let repo = repo();
        repo.insert_header(header("5", None, "FIRST"));
        repo.insert_header(header("5", None, "SECOND"));

        let fetched = repo.fetch_header(&id("5")).await.unwrap().unwrap();
        assert_eq!(fetched.record.get("Customer_ID"), Some("FIRST"));
        assert!(fetched.flag.is_pending());
        assert!(repo.fetch_header(&id("6")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_lines_sorted() {
        let repo = repo();
        repo.insert_line(line("5", "10", "C"));
        repo.insert_line(line("5", "2", "B"));
        repo.insert_line(line("6", "1", "X"));
        repo.insert_line(line("5", "1", "A"));

        let lines = repo.fetch_lines(&id("5")).await.unwrap();
        let items: Vec<_> = lines.iter().map(|l| l.record.get("Item_ID").unwrap()).collect();
        assert_eq!(items, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_mark_exported_sets_sentinel() {
        let repo = repo();
        repo.insert_header(header("5", None, "A"));

        assert_eq!(repo.mark_exported(&id("5")).await.unwrap(), 1);
        assert_eq!(repo.flag_of("5"), Some("Y".to_string()));
        assert!(repo.list_pending_import_sets().await.unwrap().is_empty());
        assert!(repo.mark_exported(&id("9")).await.is_err());
        assert_eq!(repo.mark_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures_scoped_by_id() {
        let repo = repo();
        repo.insert_header(header("1", None, "A"));
        repo.insert_header(header("2", None, "B"));
        repo.fail(FailurePoint::FetchHeader, Some("1"));

        assert!(repo.fetch_header(&id("1")).await.is_err());
        assert!(repo.fetch_header(&id("2")).await.is_ok());

        repo.fail(FailurePoint::Connection, None);
        assert!(matches!(
            repo.test_connection().await,
            Err(OrderExportError::Connection(_))
        ));

        repo.clear_failures();
        assert!(repo.test_connection().await.is_ok());
        assert!(repo.fetch_header(&id("1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_seed_json() {
        let json = r#"{
            "headers": [{"Import_Set_No": "7", "Customer_ID": 1001, "Exported": null}],
            "lines": [
                {"Import_Set_Number": "7", "Line_No": 2, "Unit_Price": 3.5},
                {"Import_Set_Number": "7", "Line_No": 1, "Unit_Price": "1.25"}
            ]
        }"#;
        let repo = InMemoryRepository::from_seed_json(StagingConfig::default(), json).unwrap();

        let header = repo.fetch_header(&id("7")).await.unwrap().unwrap();
        assert_eq!(header.record.get("Customer_ID"), Some("1001"));

        let lines = repo.fetch_lines(&id("7")).await.unwrap();
        assert_eq!(lines[0].line_no.as_deref(), Some("1"));
        assert_eq!(lines[1].record.get("Unit_Price"), Some("3.5"));
    }

    #[test]
    fn test_seed_json_invalid() {
        assert!(InMemoryRepository::from_seed_json(StagingConfig::default(), "[1, 2]").is_err());
    }
}
