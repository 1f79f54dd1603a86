//! Header/line file pair writer
//!
//! Both files of an import set are staged under temporary names and only
//! renamed into place once both writes succeeded. The line file is moved
//! first and removed again if the header cannot follow, so a failed write
//! never leaves a new file of the pair in place.

use crate::domain::{ImportSetId, OrderExportError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Suffix appended to staged files before the final rename
const STAGING_SUFFIX: &str = ".tmp";

/// Record terminator written between and after records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Platform convention (`\r\n` on Windows, `\n` elsewhere)
    #[default]
    Native,
    /// `\n`
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Terminator string
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Native => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            LineEnding::Lf => "\n",
            LineEnding::Crlf => "\r\n",
        }
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(LineEnding::Native),
            "lf" => Ok(LineEnding::Lf),
            "crlf" => Ok(LineEnding::Crlf),
            _ => Err(format!(
                "Invalid line ending '{s}'. Must be one of: native, lf, crlf"
            )),
        }
    }
}

/// Naming and serialization settings for export files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    /// Output directory, created on demand
    pub directory: PathBuf,
    /// Header file name prefix
    pub header_prefix: String,
    /// Line file name prefix
    pub line_prefix: String,
    /// File extension without the dot
    pub extension: String,
    /// Record terminator
    pub line_ending: LineEnding,
    /// Zero-pad the id in file names to this width; raw id when unset
    pub file_id_width: Option<usize>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("exports"),
            header_prefix: "SOH".to_string(),
            line_prefix: "SOL".to_string(),
            extension: "txt".to_string(),
            line_ending: LineEnding::Native,
            file_id_width: None,
        }
    }
}

/// Paths of a written file pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFiles {
    /// Header file
    pub header_path: PathBuf,
    /// Line file
    pub line_path: PathBuf,
}

/// Writes rendered header and line records to disk
#[derive(Debug, Clone)]
pub struct ExportFileWriter {
    options: WriterOptions,
}

impl ExportFileWriter {
    /// Creates a writer
    pub fn new(options: WriterOptions) -> Self {
        Self { options }
    }

    /// Writer settings
    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Output directory
    pub fn directory(&self) -> &Path {
        &self.options.directory
    }

    /// Final paths for an import set
    ///
    /// # Errors
    ///
    /// Returns an error if the id cannot be used as part of a file name.
    pub fn paths_for(&self, id: &ImportSetId) -> Result<ExportFiles> {
        let name_id = self.file_id(id)?;
        let ext = &self.options.extension;
        let file_name = |prefix: &str| {
            if ext.is_empty() {
                format!("{prefix}{name_id}")
            } else {
                format!("{prefix}{name_id}.{ext}")
            }
        };

        Ok(ExportFiles {
            header_path: self
                .options
                .directory
                .join(file_name(&self.options.header_prefix)),
            line_path: self
                .options
                .directory
                .join(file_name(&self.options.line_prefix)),
        })
    }

    fn file_id(&self, id: &ImportSetId) -> Result<String> {
        let raw = id.as_str();
        if raw.contains(['/', '\\', '\0']) || raw.trim() == "." || raw.trim() == ".." {
            return Err(OrderExportError::Validation(format!(
                "Import set id '{raw}' cannot be used in a file name"
            )));
        }

        Ok(match self.options.file_id_width {
            Some(width) => id.zero_padded(width),
            None => raw.to_string(),
        })
    }

    /// Serializes records with the configured terminator
    ///
    /// Every record, including the last, is followed by the terminator.
    pub fn serialize(&self, records: &[String]) -> String {
        let terminator = self.options.line_ending.as_str();
        let mut content = String::new();
        for record in records {
            content.push_str(record);
            content.push_str(terminator);
        }
        content
    }

    /// Writes the header/line pair for an import set
    ///
    /// Existing files for the id are overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or either file
    /// cannot be written or moved into place. Staged files, and a line file
    /// already moved into place, are removed on failure.
    pub async fn write_pair(
        &self,
        id: &ImportSetId,
        header_records: &[String],
        line_records: &[String],
    ) -> Result<ExportFiles> {
        let files = self.paths_for(id)?;

        fs::create_dir_all(&self.options.directory)
            .await
            .map_err(|e| {
                OrderExportError::Io(format!(
                    "Failed to create export directory {}: {}",
                    self.options.directory.display(),
                    e
                ))
            })?;

        let header_staged = staged_path(&files.header_path);
        let line_staged = staged_path(&files.line_path);

        let staged = async {
            write_file(&header_staged, &self.serialize(header_records)).await?;
            write_file(&line_staged, &self.serialize(line_records)).await
        }
        .await;

        if let Err(e) = staged {
            remove_quietly(&header_staged).await;
            remove_quietly(&line_staged).await;
            return Err(e);
        }

        if let Err(e) = rename(&line_staged, &files.line_path).await {
            remove_quietly(&header_staged).await;
            remove_quietly(&line_staged).await;
            return Err(e);
        }

        if let Err(e) = rename(&header_staged, &files.header_path).await {
            remove_quietly(&header_staged).await;
            remove_quietly(&files.line_path).await;
            return Err(e);
        }

        tracing::debug!(
            import_set = %id,
            header_file = %files.header_path.display(),
            line_file = %files.line_path.display(),
            "Export files written"
        );

        Ok(files)
    }
}

fn staged_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(STAGING_SUFFIX);
    PathBuf::from(staged)
}

async fn write_file(path: &Path, content: &str) -> Result<()> {
    let mut file = fs::File::create(path).await.map_err(|e| {
        OrderExportError::Io(format!("Failed to create {}: {}", path.display(), e))
    })?;
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| OrderExportError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    file.sync_all()
        .await
        .map_err(|e| OrderExportError::Io(format!("Failed to sync {}: {}", path.display(), e)))?;
    Ok(())
}

async fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).await.map_err(|e| {
        OrderExportError::Io(format!(
            "Failed to move {} to {}: {}",
            from.display(),
            to.display(),
            e
        ))
    })
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove export file");
        }
    }
}
