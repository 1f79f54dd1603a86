//! End-to-end tests for export cycles
//!
//! These tests verify that:
//! - A pending import set produces one header file and one line file
//! - Lines are written in line-number order and the header gets flagged
//! - A second cycle leaves exported import sets alone
//! - Incomplete import sets are skipped without state changes
//! - Failures stay scoped to one import set

use order_export::adapters::database::ImportSetRepository;
use order_export::adapters::memory::{FailurePoint, InMemoryRepository};
use order_export::config::{load_config_str, StagingConfig};
use order_export::core::export::{
    CycleStatus, ExportFileWriter, ExportPipeline, ExportProcessor, ImportSetReport, LineEnding,
    SkipReason, WriterOptions,
};
use order_export::core::layout::LayoutSet;
use order_export::domain::{ImportSetId, Record};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn pipeline(repository: Arc<InMemoryRepository>, dir: &Path, dry_run: bool) -> ExportPipeline {
    let writer = ExportFileWriter::new(WriterOptions {
        directory: dir.to_path_buf(),
        line_ending: LineEnding::Lf,
        ..WriterOptions::default()
    });
    ExportPipeline::new(ExportProcessor::new(
        repository,
        LayoutSet::standard(),
        writer,
        dry_run,
    ))
}

fn stage_order(repository: &InMemoryRepository, id: &str) {
    repository.insert_header(
        Record::new()
            .with("Import_Set_No", id)
            .with("Customer_ID", "C100")
            .with("Customer_Name", "Acme Supply")
            .with("Order_Date", "06151990"),
    );
    // staged out of order on purpose
    for (line_no, item) in [("2", "BOLT-10"), ("1", "NUT-4")] {
        repository.insert_line(
            Record::new()
                .with("Import_Set_Number", id)
                .with("Line_No", line_no)
                .with("Item_ID", item)
                .with("Unit_Quantity", "3.000000")
                .with("Unit_Price", "12.340000")
                .with("Required_Date", "2023-06-15"),
        );
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_pending_import_set_is_exported_once() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("exports");
    let repository = Arc::new(InMemoryRepository::new(StagingConfig::default()));
    stage_order(&repository, "0005");
    let pipeline = pipeline(repository.clone(), &out, false);

    let summary = pipeline.run_cycle().await;

    assert_eq!(summary.status, CycleStatus::Completed);
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.exported, 1);
    assert_eq!(file_names(&out), vec!["SOH0005.txt", "SOL0005.txt"]);

    let header = fs::read_to_string(out.join("SOH0005.txt")).unwrap();
    let header_records: Vec<&str> = header.lines().collect();
    assert_eq!(header_records.len(), 1);
    assert!(header.ends_with('\n'));
    let fields: Vec<&str> = header_records[0].split('\t').collect();
    assert_eq!(fields.len(), 15);
    assert_eq!(fields[0], "0005");
    assert_eq!(fields[1], "C100");
    assert_eq!(fields[2], "Acme Supply");
    assert_eq!(fields[5], "06/15/90");

    let lines = fs::read_to_string(out.join("SOL0005.txt")).unwrap();
    let line_records: Vec<Vec<&str>> = lines.lines().map(|l| l.split('\t').collect()).collect();
    assert_eq!(line_records.len(), 2);
    assert_eq!(line_records[0][1], "1");
    assert_eq!(line_records[0][2], "NUT-4");
    assert_eq!(line_records[1][1], "2");
    assert_eq!(line_records[1][2], "BOLT-10");
    assert_eq!(line_records[0].len(), 9);
    assert_eq!(line_records[0][3], "3");
    assert_eq!(line_records[0][5], "12.34");
    assert_eq!(line_records[0][7], "06/15/23");

    assert_eq!(repository.flag_of("0005"), Some("Y".to_string()));
    assert_eq!(repository.mark_calls(), 1);

    // second cycle: nothing pending, nothing rewritten
    let header_before = fs::metadata(out.join("SOH0005.txt")).unwrap().modified().unwrap();
    let second = pipeline.run_cycle().await;

    assert_eq!(second.pending, 0);
    assert_eq!(second.exported, 0);
    assert_eq!(repository.mark_calls(), 1);
    assert_eq!(
        fs::metadata(out.join("SOH0005.txt")).unwrap().modified().unwrap(),
        header_before
    );
}

#[tokio::test]
async fn test_incomplete_import_sets_are_skipped() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(InMemoryRepository::new(StagingConfig::default()));
    // header without lines
    repository.insert_header(Record::new().with("Import_Set_No", "10"));
    // lines without header are never listed as pending
    repository.insert_line(
        Record::new()
            .with("Import_Set_Number", "11")
            .with("Line_No", "1"),
    );
    let pipeline = pipeline(repository.clone(), dir.path(), false);

    let summary = pipeline.run_cycle().await;

    assert_eq!(summary.pending, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        summary.import_sets,
        vec![ImportSetReport::Skipped {
            import_set: "10".to_string(),
            reason: SkipReason::NoLines,
        }]
    );
    assert_eq!(repository.flag_of("10"), None);
    assert_eq!(repository.mark_calls(), 0);
    assert!(file_names(dir.path()).is_empty());

    // lines arriving later make it exportable
    repository.insert_line(
        Record::new()
            .with("Import_Set_Number", "10")
            .with("Line_No", "1"),
    );
    let summary = pipeline.run_cycle().await;
    assert_eq!(summary.exported, 1);
    assert_eq!(repository.flag_of("10"), Some("Y".to_string()));
}

#[tokio::test]
async fn test_failure_of_one_import_set_does_not_stop_cycle() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(InMemoryRepository::new(StagingConfig::default()));
    stage_order(&repository, "1");
    stage_order(&repository, "2");
    stage_order(&repository, "3");
    repository.fail(FailurePoint::FetchLines, Some("2"));
    let pipeline = pipeline(repository.clone(), dir.path(), false);

    let summary = pipeline.run_cycle().await;

    assert_eq!(summary.exported, 2);
    assert_eq!(summary.failed, 1);
    assert!(!summary.is_successful());
    assert_eq!(repository.flag_of("1"), Some("Y".to_string()));
    assert_eq!(repository.flag_of("2"), None);
    assert_eq!(repository.flag_of("3"), Some("Y".to_string()));
    assert!(!dir.path().join("SOH2.txt").exists());

    // retried on the next cycle once the fault clears
    repository.clear_failures();
    let retry = pipeline.run_cycle().await;
    assert_eq!(retry.pending, 1);
    assert_eq!(retry.exported, 1);
}

#[tokio::test]
async fn test_post_write_failure_is_flagged_for_reconcile() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(InMemoryRepository::new(StagingConfig::default()));
    stage_order(&repository, "7");
    repository.fail(FailurePoint::MarkExported, None);
    let pipeline = pipeline(repository.clone(), dir.path(), false);

    let summary = pipeline.run_cycle().await;

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.needs_reconcile(), vec!["7"]);
    assert!(dir.path().join("SOH7.txt").exists());
    assert!(dir.path().join("SOL7.txt").exists());
    assert_eq!(repository.flag_of("7"), None);

    // still pending, so the files are written again
    repository.clear_failures();
    let retry = pipeline.run_cycle().await;
    assert_eq!(retry.exported, 1);
    assert_eq!(repository.flag_of("7"), Some("Y".to_string()));
}

#[tokio::test]
async fn test_unreachable_store_fails_cycle_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(InMemoryRepository::new(StagingConfig::default()));
    stage_order(&repository, "1");
    repository.fail(FailurePoint::ListPending, None);
    let pipeline = pipeline(repository.clone(), dir.path(), false);

    let summary = pipeline.run_cycle().await;

    assert_eq!(summary.status, CycleStatus::Failed);
    assert!(summary.import_sets.is_empty());
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let repository = Arc::new(InMemoryRepository::new(StagingConfig::default()));
    stage_order(&repository, "5");
    let pipeline = pipeline(repository.clone(), dir.path(), true);

    let summary = pipeline.run_cycle().await;

    assert!(summary.dry_run);
    assert_eq!(summary.exported, 1);
    assert!(file_names(dir.path()).is_empty());
    assert_eq!(repository.flag_of("5"), None);
    assert_eq!(repository.mark_calls(), 0);
}

#[tokio::test]
async fn test_pipeline_from_seeded_config() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.json");
    fs::write(
        &seed,
        r#"{
  "headers": [
    {"Import_Set_No": "20", "Customer_ID": "C1", "Exported": null},
    {"Import_Set_No": "3", "Customer_ID": "C2", "Exported": " "},
    {"Import_Set_No": "9", "Customer_ID": "C3", "Exported": "Y"}
  ],
  "lines": [
    {"Import_Set_Number": "20", "Line_No": 1, "Item_ID": "A"},
    {"Import_Set_Number": "3", "Line_No": 1, "Item_ID": "B"}
  ]
}"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    let toml = format!(
        "database_target = \"memory\"\n\n[memory]\nseed_file = {seed:?}\n\n[export]\ndirectory = {out:?}\nline_ending = \"lf\"\nfile_id_width = 6\n",
        seed = seed.to_string_lossy(),
        out = out.to_string_lossy(),
    );
    let config = load_config_str(&toml).unwrap();
    let pipeline = ExportPipeline::from_config(&config).unwrap();

    let pending = pipeline.pending_import_sets().await.unwrap();
    let ids: Vec<&str> = pending.iter().map(ImportSetId::as_str).collect();
    assert_eq!(ids, vec!["3", "20"]);

    let summary = pipeline.run_cycle().await;
    assert_eq!(summary.exported, 2);
    assert_eq!(
        file_names(&out),
        vec!["SOH000003.txt", "SOH000020.txt", "SOL000003.txt", "SOL000020.txt"]
    );

    let header = pipeline
        .processor()
        .repository()
        .fetch_header(&ImportSetId::new("20").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(!header.flag.is_pending());
}

#[tokio::test]
async fn test_renamed_key_columns_flow_into_files() {
    let dir = TempDir::new().unwrap();
    let seed = dir.path().join("seed.json");
    fs::write(
        &seed,
        r#"{
  "headers": [
    {"Order_Ref": "7", "Customer_ID": "C1", "Exported": null}
  ],
  "lines": [
    {"Order_Ref": "7", "Seq": 2, "Item_ID": "B"},
    {"Order_Ref": "7", "Seq": 1, "Item_ID": "A"}
  ]
}"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    let toml = format!(
        "database_target = \"memory\"\n\n[memory]\nseed_file = {seed:?}\n\n[staging]\nheader_id_column = \"Order_Ref\"\nline_id_column = \"Order_Ref\"\nline_number_column = \"Seq\"\n\n[export]\ndirectory = {out:?}\nline_ending = \"lf\"\n",
        seed = seed.to_string_lossy(),
        out = out.to_string_lossy(),
    );
    let config = load_config_str(&toml).unwrap();
    let pipeline = ExportPipeline::from_config(&config).unwrap();

    let summary = pipeline.run_cycle().await;
    assert_eq!(summary.exported, 1);

    let header = fs::read_to_string(out.join("SOH7.txt")).unwrap();
    let lines = fs::read_to_string(out.join("SOL7.txt")).unwrap();
    assert!(header.starts_with("0007\tC1\t"));
    let records: Vec<&str> = lines.lines().collect();
    assert_eq!(records.len(), 2);
    assert!(records[0].starts_with("0007\t1\tA\t"));
    assert!(records[1].starts_with("0007\t2\tB\t"));
}
