//! Relational sink over `sqlx` (spec §6 "Persisted state layout (DB sink)").
//! One table per entry kind plus a shared `modifiers` join table keyed by
//! the entry's UUID; one batch is one transaction, so a failed flush never
//! leaves a partial batch visible. DDL/migrations are supplied by the
//! integrator, per spec.md §1 — this crate only issues `INSERT`s against a
//! schema it assumes already exists.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use uuid::Uuid;

use evget_core::error::{storage_error, Result};
use evget_core::event::{Data, Entry, EventBatch};
use evget_core::{BoxFuture, Sink};

/// `Key` is reserved-adjacent in most SQL dialects, so its table is named
/// `key_events`; every other table is the entry kind in `snake_case`.
fn table_name(entry: &Entry) -> &'static str {
    match entry {
        Entry::MouseMove(_) => "mouse_move",
        Entry::MouseClick(_) => "mouse_click",
        Entry::MouseScroll(_) => "mouse_scroll",
        Entry::Key(_) => "key_events",
    }
}

pub struct DbSink {
    pool: SqlitePool,
}

impl DbSink {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `url` (e.g. `sqlite://events.db`) and verifies
    /// connectivity with a round-trip query. The schema itself is not
    /// created here (spec.md §1 Non-goals: no DDL/migration tooling).
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| storage_error(format!("failed to connect to {url}: {e}")))?;
        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| storage_error(format!("connectivity check failed: {e}")))?;
        Ok(Self { pool })
    }

    async fn insert_entry(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, data: &Data) -> sqlx::Result<()> {
        let entry_uuid = Uuid::new_v4().to_string();
        let common = data.primary.common();
        let table = table_name(&data.primary);

        let mut columns = vec![
            "entry_uuid", "interval", "timestamp", "device_kind", "device_name",
            "position_x", "position_y", "focus_window_name", "focus_window_position_x",
            "focus_window_position_y", "focus_window_width", "focus_window_height",
        ];
        let mut kind_columns = kind_specific_columns(&data.primary);
        columns.append(&mut kind_columns);

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut query = sqlx::query(&sql)
            .bind(entry_uuid.clone())
            .bind(common.interval)
            .bind(common.timestamp)
            .bind(common.device_kind.to_string())
            .bind(common.device_name.clone())
            .bind(common.position_x)
            .bind(common.position_y)
            .bind(common.focus_window_name.clone())
            .bind(common.focus_window_position_x)
            .bind(common.focus_window_position_y)
            .bind(common.focus_window_width)
            .bind(common.focus_window_height);
        for value in kind_specific_values(&data.primary) {
            query = query.bind(value);
        }
        query.execute(&mut **tx).await?;

        for modifier in &data.modifiers {
            sqlx::query("INSERT INTO modifiers (entry_uuid, modifier_value) VALUES (?1, ?2)")
                .bind(&entry_uuid)
                .bind(modifier.modifier_value.to_string())
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

/// Kind-specific column names, in bind order (spec §3 per-kind fields).
fn kind_specific_columns(entry: &Entry) -> Vec<&'static str> {
    match entry {
        Entry::MouseMove(_) => vec![],
        Entry::MouseClick(_) => vec!["action", "button_id", "button_name"],
        Entry::MouseScroll(_) => vec!["vertical_delta", "horizontal_delta"],
        Entry::Key(_) => vec!["action", "key_code", "character", "key_name"],
    }
}

/// Kind-specific bound values, matching [`kind_specific_columns`]'s order.
fn kind_specific_values(entry: &Entry) -> Vec<String> {
    match entry {
        Entry::MouseMove(_) => vec![],
        Entry::MouseClick(e) => vec![e.action.to_string(), e.button_id.to_string(), e.button_name.clone()],
        Entry::MouseScroll(e) => vec![e.vertical_delta.to_string(), e.horizontal_delta.to_string()],
        Entry::Key(e) => {
            vec![e.action.to_string(), e.key_code.to_string(), e.character.clone(), e.key_name.clone()]
        }
    }
}

impl Sink for DbSink {
    fn init(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| storage_error(format!("db sink init check failed: {e}")))?;
            Ok(())
        })
    }

    fn store(&self, batch: EventBatch) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if batch.is_empty() {
                return Ok(());
            }

            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| storage_error(format!("failed to begin transaction: {e}")))?;

            for data in &batch {
                Self::insert_entry(&mut tx, data)
                    .await
                    .map_err(|e| storage_error(format!("insert failed: {e}")))?;
            }

            tx.commit().await.map_err(|e| storage_error(format!("commit failed: {e}")))?;
            tracing::debug!(count = batch.len(), "db sink committed batch");
            Ok(())
        })
    }
}
