//! PostgreSQL implementation of the staging repository
//!
//! Rows are read as `(row, column, text value)` triples through
//! `json_each_text(to_json(row))`, so any staging table shape maps onto a
//! [`Record`] without a fixed column list. Identifiers come from
//! configuration and are always quoted; values are always bound.

use crate::adapters::database::traits::ImportSetRepository;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::StagingConfig;
use crate::domain::ids::pending_ids_from_raw;
use crate::domain::order::sort_lines;
use crate::domain::{ExportFlag, Header, ImportSetId, Line, OrderExportError, Record, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::Row;

/// Quotes a possibly schema-qualified identifier
///
/// `sales.TMP_OE_Header` becomes `"sales"."TMP_OE_Header"`.
pub fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.trim().replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// SQL statements for one staging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingQueries {
    /// Distinct pending ids; `$1` is the exported sentinel
    pub list_pending: String,
    /// Header rows of one id as column/value pairs; `$1` is the id
    pub fetch_header: String,
    /// Line rows of one id as column/value pairs; `$1` is the id
    pub fetch_lines: String,
    /// Flag update; `$1` is the sentinel, `$2` the id
    pub mark_exported: String,
}

impl StagingQueries {
    /// Builds the statements for the configured tables and columns
    pub fn new(staging: &StagingConfig) -> Self {
        let header_table = quote_identifier(&staging.header_table);
        let line_table = quote_identifier(&staging.line_table);
        let header_id = quote_identifier(&staging.header_id_column);
        let line_id = quote_identifier(&staging.line_id_column);
        let flag = quote_identifier(&staging.flag_column);

        let rows_as_pairs = |table: &str, id_column: &str| {
            format!(
                "SELECT t.ctid::text AS row_id, f.key AS column_name, f.value AS column_value \
                 FROM {table} AS t CROSS JOIN LATERAL json_each_text(to_json(t)) AS f \
                 WHERE t.{id_column}::text = $1 \
                 ORDER BY t.ctid"
            )
        };

        Self {
            list_pending: format!(
                "SELECT DISTINCT h.{header_id}::text AS import_set \
                 FROM {header_table} AS h \
                 WHERE h.{header_id} IS NOT NULL \
                 AND COALESCE(NULLIF(BTRIM(h.{flag}::text), ''), 'N') <> $1"
            ),
            fetch_header: rows_as_pairs(&header_table, &header_id),
            fetch_lines: rows_as_pairs(&line_table, &line_id),
            mark_exported: format!(
                "UPDATE {header_table} SET {flag} = $1 WHERE {header_id}::text = $2"
            ),
        }
    }
}

/// Folds `(row_id, column, value)` triples into records, keeping row order
fn group_rows<I>(pairs: I) -> Vec<Record>
where
    I: IntoIterator<Item = (String, String, Option<String>)>,
{
    let mut records: Vec<(String, Record)> = Vec::new();
    for (row_id, column, value) in pairs {
        match records.last_mut() {
            Some((current, record)) if *current == row_id => record.set(column, value),
            _ => {
                let mut record = Record::new();
                record.set(column, value);
                records.push((row_id, record));
            }
        }
    }
    records.into_iter().map(|(_, record)| record).collect()
}

fn row_triple(row: &Row) -> Result<(String, String, Option<String>)> {
    let read = |e: tokio_postgres::Error| {
        OrderExportError::Database(format!("Unexpected staging row shape: {}", e))
    };
    Ok((
        row.try_get(0).map_err(read)?,
        row.try_get(1).map_err(read)?,
        row.try_get(2).map_err(read)?,
    ))
}

/// PostgreSQL staging repository
pub struct PostgreSQLRepository {
    client: Arc<PostgreSQLClient>,
    staging: StagingConfig,
    queries: StagingQueries,
}

impl PostgreSQLRepository {
    /// Create a repository over a pooled client
    pub fn new(client: Arc<PostgreSQLClient>, staging: StagingConfig) -> Self {
        let queries = StagingQueries::new(&staging);
        Self {
            client,
            staging,
            queries,
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn fetch_records(&self, sql: &str, id: &ImportSetId) -> Result<Vec<Record>> {
        let rows = self.client.query(sql, &[&id.as_str()]).await?;
        let triples = rows.iter().map(row_triple).collect::<Result<Vec<_>>>()?;
        Ok(group_rows(triples))
    }

    fn exported_value(&self) -> &str {
        self.staging.exported_value.trim()
    }
}

#[async_trait]
impl ImportSetRepository for PostgreSQLRepository {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn list_pending_import_sets(&self) -> Result<Vec<ImportSetId>> {
        let rows = self
            .client
            .query(&self.queries.list_pending, &[&self.exported_value()])
            .await?;

        let raw = rows
            .iter()
            .map(|row| {
                row.try_get::<_, Option<String>>(0).map_err(|e| {
                    OrderExportError::Database(format!("Unexpected pending id value: {}", e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(pending_ids_from_raw(raw))
    }

    async fn fetch_header(&self, id: &ImportSetId) -> Result<Option<Header>> {
        let records = self.fetch_records(&self.queries.fetch_header, id).await?;

        if records.len() > 1 {
            tracing::warn!(
                import_set = %id,
                rows = records.len(),
                "Multiple header rows staged for import set; using the first"
            );
        }

        let Some(record) = records.into_iter().next() else {
            return Ok(None);
        };
        let flag = ExportFlag::from_raw(record.get(&self.staging.flag_column), self.exported_value());

        Ok(Some(Header {
            import_set: id.clone(),
            flag,
            record,
        }))
    }

    async fn fetch_lines(&self, id: &ImportSetId) -> Result<Vec<Line>> {
        let records = self.fetch_records(&self.queries.fetch_lines, id).await?;

        let mut lines: Vec<Line> = records
            .into_iter()
            .map(|record| Line {
                import_set: id.clone(),
                line_no: record.get(&self.staging.line_number_column).map(str::to_string),
                record,
            })
            .collect();
        sort_lines(&mut lines);
        Ok(lines)
    }

    async fn mark_exported(&self, id: &ImportSetId) -> Result<u64> {
        let updated = self
            .client
            .execute(&self.queries.mark_exported, &[&self.exported_value(), &id.as_str()])
            .await
            .map_err(|e| OrderExportError::State(format!("Failed to flag import set {id}: {e}")))?;

        if updated == 0 {
            return Err(OrderExportError::State(format!(
                "No header row flagged for import set {id}"
            )));
        }
        Ok(updated)
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}
