pub mod comment;
mod cursor;
pub mod karma;
pub mod like;
pub mod post;
pub mod schema;
pub mod thread;
pub mod user;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use karmafeed_core::ServiceError;
use karmafeed_sql::{Row, SQLError, SQLStore, Value};

/// Feed policy knobs, overridable from server configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Maximum allowed reply depth; `None` means unlimited. Enforced
    /// where comments are created, never during tree assembly — the
    /// assembler stays correct at any depth.
    pub max_comment_depth: Option<i64>,

    /// Page size used when a feed request does not specify one.
    pub default_page_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_comment_depth: None,
            default_page_size: 20,
        }
    }
}

/// Feed service — holds the storage backend and provides business logic.
pub struct FeedService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: FeedConfig,
}

impl FeedService {
    pub fn new(sql: Arc<dyn SQLStore>, config: FeedConfig) -> Result<Self, ServiceError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql, config })
    }

    // ── Generic record helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(storage_err)?;
        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ServiceError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(storage_err)?;
        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ServiceError> {
        let json = serde_json::to_string(record)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql.exec(&sql, &params).map_err(storage_err)?;
        if affected == 0 {
            return Err(ServiceError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }
}

/// Map a storage failure into the service taxonomy: uniqueness conflicts
/// are their own outcome, everything else is transient and retryable.
pub(crate) fn storage_err(e: SQLError) -> ServiceError {
    match e {
        SQLError::Constraint(msg) => ServiceError::Conflict(msg),
        other => ServiceError::Storage(other.to_string()),
    }
}

/// Deserialize the `data` column of each row.
pub(crate) fn rows_to_records<T: DeserializeOwned>(rows: &[Row]) -> Result<Vec<T>, ServiceError> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let data = row
            .get_str("data")
            .ok_or_else(|| ServiceError::Internal("missing data column".into()))?;
        let item: T =
            serde_json::from_str(data).map_err(|e| ServiceError::Internal(e.to_string()))?;
        items.push(item);
    }
    Ok(items)
}
