//! Price Log - Append-only JSONL Price Time Series
//!
//! Persists price records to daily JSONL files in the format
//! `prices/YYYY-MM-DD.jsonl`, partitioned by `captured_at`. Each line
//! is a self-contained JSON record; a crash mid-write can at worst
//! leave one truncated trailing line, which readers skip.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::domain::{PriceRecord, StoreError};
use crate::ports::{PriceQuery, PriceRepository};

/// Append-only JSONL price log with daily file rotation.
pub struct PriceLog {
    /// Directory holding the daily files.
    prices_dir: PathBuf,
    /// Serializes appends so concurrent lines never interleave.
    write_lock: Mutex<()>,
}

impl PriceLog {
    /// Open (and create if needed) the log under `data_dir/prices`.
    pub async fn open(data_dir: &str) -> Result<Self, StoreError> {
        let prices_dir = Path::new(data_dir).join("prices");
        fs::create_dir_all(&prices_dir).await?;

        Ok(Self {
            prices_dir,
            write_lock: Mutex::new(()),
        })
    }

    fn partition_path(&self, record: &PriceRecord) -> PathBuf {
        let date = record.captured_at.format("%Y-%m-%d");
        self.prices_dir.join(format!("{date}.jsonl"))
    }

    /// Partition files, newest day first.
    ///
    /// Daily names (`YYYY-MM-DD.jsonl`) sort chronologically, and every
    /// record in a newer partition is newer than any in an older one.
    async fn partitions_newest_first(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = match fs::read_dir(&self.prices_dir).await {
            Ok(entries) => entries,
            Err(e) => return Err(StoreError::Unavailable(format!("{}: {e}", self.prices_dir.display()))),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(paths)
    }

    /// Readable records of one partition, skipping malformed lines.
    async fn read_partition(path: &Path) -> Result<Vec<PriceRecord>, StoreError> {
        let content = fs::read_to_string(path).await?;
        let mut records = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<PriceRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    file = %path.display(),
                    line = line_no + 1,
                    error = %e,
                    "Skipping malformed price record"
                ),
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl PriceRepository for PriceLog {
    #[instrument(skip(self, record), fields(dex = %record.dex_name))]
    async fn append(&self, record: &PriceRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let path = self.partition_path(record);

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(file = %path.display(), "Price record appended");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn query(&self, query: &PriceQuery) -> Result<Vec<PriceRecord>, StoreError> {
        if query.limit == Some(0) {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for path in self.partitions_newest_first().await? {
            let mut partition = Self::read_partition(&path).await?;
            if let Some(dex) = &query.dex_name {
                partition.retain(|r| &r.dex_name == dex);
            }
            partition.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
            records.extend(partition);

            if let Some(limit) = query.limit {
                if records.len() >= limit {
                    records.truncate(limit);
                    break;
                }
            }
        }
        Ok(records)
    }

    async fn is_healthy(&self) -> bool {
        let probe = self.prices_dir.join(".health_check");
        let result = fs::write(&probe, b"ok").await;
        let _ = fs::remove_file(&probe).await;
        result.is_ok()
    }
}
