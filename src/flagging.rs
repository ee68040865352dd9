//! Append-only log of predictions users flagged as bad.
//!
//! Records are stored one JSON object per line.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use utoipa::ToSchema;

/// Why a prediction was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum FlagOption {
    Incorrect,
    Insufficient,
    Offensive,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRecord {
    /// Displayed field values at the time of flagging.
    pub fields: Vec<String>,
    pub option: FlagOption,
    pub prediction_id: Option<String>,
    /// Position of the flagged sample in the displayed list.
    #[serde(default)]
    pub flag_index: Option<usize>,
    pub username: Option<String>,
    pub flagged_at: DateTime<Utc>,
}

impl FlagRecord {
    pub fn new(fields: Vec<String>, option: FlagOption) -> Self {
        Self {
            fields,
            option,
            prediction_id: None,
            flag_index: None,
            username: None,
            flagged_at: Utc::now(),
        }
    }
}

pub struct FlagLog {
    path: PathBuf,
    /// Number of records in the file; also serializes appends.
    count: Mutex<usize>,
}

impl FlagLog {
    /// Opens (or prepares) the log at `path`, counting existing records.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let count = match fs::read_to_string(&path).await {
            Ok(contents) => contents.lines().filter(|l| !l.trim().is_empty()).count(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(e).with_context(|| format!("reading flag log {}", path.display()))
            }
        };

        tracing::info!(path = %path.display(), count, "flag log opened");
        Ok(Self {
            path,
            count: Mutex::new(count),
        })
    }

    /// Appends a record and returns the total number of flagged records.
    pub async fn append(&self, record: &FlagRecord) -> Result<usize> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut count = self.count.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening flag log {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        *count += 1;
        tracing::info!(
            option = ?record.option,
            prediction_id = ?record.prediction_id,
            flag_index = ?record.flag_index,
            total = *count,
            "prediction flagged"
        );
        Ok(*count)
    }

    pub async fn count(&self) -> usize {
        *self.count.lock().await
    }
}
