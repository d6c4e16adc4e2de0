//! Pre-publish staging of the accumulated table.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::EditHistoryTable;

/// Staged table with the day it covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedTable {
    pub date: NaiveDate,
    pub staged_at: DateTime<Utc>,
    pub count: usize,
    pub table: EditHistoryTable,
}

impl StagedTable {
    pub fn new(date: NaiveDate, table: EditHistoryTable) -> Self {
        Self {
            date,
            staged_at: Utc::now(),
            count: table.len(),
            table,
        }
    }
}

/// Directory holding one JSON snapshot per day.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root_dir: PathBuf,
}

impl StagingArea {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Snapshot path for a given day.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.root_dir.join(format!("edits-{}.json", date.format("%Y-%m-%d")))
    }

    /// Write the table atomically (write to temp, then rename).
    pub async fn write(&self, date: NaiveDate, table: &EditHistoryTable) -> Result<PathBuf> {
        let path = self.path_for(date);
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let staged = StagedTable::new(date, table.clone());
        let bytes = serde_json::to_vec(&staged)?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        log::info!("Staged {} records to {}", staged.count, path.display());
        Ok(path)
    }

    /// Read a staged table, returning None if there is none for that day.
    pub async fn load(&self, date: NaiveDate) -> Result<Option<StagedTable>> {
        let path = self.path_for(date);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Like [`load`](Self::load), but a missing snapshot is an error.
    pub async fn require(&self, date: NaiveDate) -> Result<StagedTable> {
        self.load(date)
            .await?
            .ok_or_else(|| AppError::StagingMissing(self.path_for(date).display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeType, EditRecord};
    use chrono::TimeZone;

    fn table() -> EditHistoryTable {
        EditHistoryTable::new(vec![EditRecord {
            change_type: Some(ChangeType::Other("flow".into())),
            namespace: Some(1),
            title: Some("Talk:Example".into()),
            user: None,
            user_id: None,
            is_bot: true,
            old_length: None,
            new_length: Some(3),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 10, 31, 23, 59, 59).unwrap()),
            comment: Some("c".into()),
            is_minor: false,
            is_anonymous: true,
            is_new: false,
        }])
    }

    #[tokio::test]
    async fn staged_table_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("staging"));
        let date = NaiveDate::from_ymd_opt(2024, 10, 31).unwrap();

        let path = staging.write(date, &table()).await.unwrap();
        assert!(path.ends_with("edits-2024-10-31.json"));
        assert!(!path.with_extension("tmp").exists());

        let staged = staging.require(date).await.unwrap();
        assert_eq!(staged.date, date);
        assert_eq!(staged.count, 1);
        assert_eq!(staged.table, table());
    }

    #[tokio::test]
    async fn missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();

        assert!(staging.load(date).await.unwrap().is_none());
        assert!(matches!(
            staging.require(date).await,
            Err(AppError::StagingMissing(_))
        ));
    }
}
