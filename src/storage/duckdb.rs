//! DuckDB table publisher.
//!
//! Each publish drops and recreates the target table inside a single
//! transaction, so re-running a day overwrites the previous result and a
//! failed write leaves the old table in place.

use std::path::PathBuf;

use chrono::Utc;
use duckdb::{Connection, params};

use crate::error::PublishError;
use crate::models::{ChangeType, EditHistoryTable};
use crate::storage::{PublishSummary, TablePublisher, TableTarget};

/// Publishes the narrow projection of the edit table into a DuckDB file.
#[derive(Debug, Clone)]
pub struct DuckDbPublisher {
    location: PathBuf,
}

impl DuckDbPublisher {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }


    fn connect(&self) -> Result<Connection, PublishError> {
        if let Some(parent) = self.location.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Connection::open(&self.location).map_err(|source| PublishError::ConnectionFailed {
            location: self.location.display().to_string(),
            source,
        })
    }
}

fn replace_table_sql(target: &TableTarget) -> String {
    let table = target.qualified();
    format!(
        r#"
CREATE SCHEMA IF NOT EXISTS "{schema}";
DROP TABLE IF EXISTS {table};
CREATE TABLE {table} (
    "type" VARCHAR,
    title VARCHAR,
    "user" VARCHAR,
    userid BIGINT,
    "timestamp" TIMESTAMP_NS,
    comment VARCHAR
);
"#,
        schema = target.schema,
    )
}

fn insert_sql(target: &TableTarget) -> String {
    format!(
        r#"INSERT INTO {} ("type", title, "user", userid, "timestamp", comment)
VALUES (?, ?, ?, ?, CAST(? AS TIMESTAMP_NS), ?)"#,
        target.qualified()
    )
}

impl TablePublisher for DuckDbPublisher {
    fn publish(
        &self,
        table: &EditHistoryTable,
        target: &TableTarget,
    ) -> Result<PublishSummary, PublishError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute_batch(&replace_table_sql(target))?;

        let mut rows_written = 0usize;
        {
            let mut stmt = tx.prepare(&insert_sql(target))?;
            for record in table.iter() {
                let timestamp = record.naive_timestamp();
                rows_written += stmt.execute(params![
                    record.change_type.as_ref().map(ChangeType::as_str),
                    record.title.as_deref(),
                    record.user.as_deref(),
                    record.user_id,
                    timestamp.as_deref(),
                    record.comment.as_deref(),
                ])?;
            }
        }

        tx.commit()?;
        log::info!(
            "Data saved to {} ({} rows) in {}",
            target,
            rows_written,
            self.location.display()
        );

        Ok(PublishSummary {
            target: target.clone(),
            rows_written,
            timestamp: Utc::now(),
        })
    }
}
