//! JSON file sink (spec §6 "Persisted state layout (JSON sink)").
//!
//! Grounded on `examples/original_source/evgetcore/src/Storage/JsonStorage.cpp`'s
//! `store`: one `{"entries": [...]}` document per flush, one array element
//! per `(entry, field)` pair carrying that entry's kind, the field's name,
//! its serialized value, and the modifiers active at that entry.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{json, Value};
use tracing::debug;

use evget_core::error::{storage_error, Result};
use evget_core::event::{Data, EventBatch};
use evget_core::{BoxFuture, Sink};

/// Appends one JSON document per flush to a file opened in append mode.
/// Each document is written as a single line (compact form) so the file
/// stays line-delimited for downstream tailing, unlike the original's
/// pretty-printed single-shot `ostream`.
pub struct JsonFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonFileSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| storage_error(format!("failed to open JSON sink file {}: {e}", path.display())))?;
        Ok(Self { path, file: Mutex::new(file) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn render(batch: &EventBatch) -> Value {
        let mut entries = Vec::new();
        for data in batch {
            let names = data.primary.schema();
            let values = data.primary.fields();
            let modifiers: Vec<&str> =
                data.modifiers.iter().map(|m| m.modifier_value.as_str()).collect();
            let kind = data.primary.kind().to_string();
            for (spec, value) in names.iter().zip(values.iter()) {
                entries.push(json!({
                    "type": kind,
                    "name": spec.name,
                    "data": value,
                    "modifiers": modifiers,
                }));
            }
        }
        json!({ "entries": entries })
    }
}

impl Sink for JsonFileSink {
    fn store(&self, batch: EventBatch) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if batch.is_empty() {
                return Ok(());
            }

            let document = Self::render(&batch);
            let mut file = self.file.lock().expect("json sink file lock poisoned");
            writeln!(file, "{document}")
                .map_err(|e| storage_error(format!("failed to write JSON sink document: {e}")))?;
            debug!(count = batch.len(), path = %self.path.display(), "json sink flushed batch");
            Ok(())
        })
    }
}
