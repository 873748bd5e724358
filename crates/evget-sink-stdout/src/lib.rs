//! Human-readable stdout sink (spec §2 C10: named but otherwise undetailed;
//! kept minimal). One line per entry: `Kind field=value field=value ...`,
//! followed by `modifier=Value` for each active modifier.

use std::io::{self, Write};
use std::sync::Mutex;

use evget_core::error::{storage_error, Result};
use evget_core::event::EventBatch;
use evget_core::{BoxFuture, Sink};

/// Writes each entry in a flushed batch to a locked stdout handle, one line
/// at a time. Kept deliberately dumb — there is no structured layout here,
/// unlike `evget-sink-json`; this sink exists for local inspection, not for
/// downstream parsing.
pub struct StdoutSink {
    out: Mutex<io::Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { out: Mutex::new(io::stdout()) }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for StdoutSink {
    fn store(&self, batch: EventBatch) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut out = self.out.lock().expect("stdout sink lock poisoned");
            for data in &batch {
                let names = data.primary.schema();
                let values = data.primary.fields();
                write!(out, "{}", data.kind()).map_err(|e| storage_error(e.to_string()))?;
                for (spec, value) in names.iter().zip(values.iter()) {
                    write!(out, " {}={value}", spec.name).map_err(|e| storage_error(e.to_string()))?;
                }
                for modifier in &data.modifiers {
                    write!(out, " modifier={}", modifier.modifier_value)
                        .map_err(|e| storage_error(e.to_string()))?;
                }
                writeln!(out).map_err(|e| storage_error(e.to_string()))?;
            }
            out.flush().map_err(|e| storage_error(e.to_string()))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use evget_core::event::entry::MouseMoveBuilder;
    use evget_core::event::{Data, DeviceKind, Entry};

    fn sample() -> Data {
        let mut builder = MouseMoveBuilder::default();
        builder
            .common
            .interval(1)
            .timestamp(DateTime::<Utc>::from_timestamp(0, 0).unwrap())
            .device_kind(DeviceKind::Mouse)
            .device_name("mouse0")
            .position(1.0, 2.0);
        Data::new(Entry::MouseMove(builder.build()))
    }

    #[tokio::test]
    async fn store_accepts_empty_and_nonempty_batches() {
        let sink = StdoutSink::new();
        sink.store(Vec::new()).await.unwrap();
        sink.store(vec![sample()]).await.unwrap();
    }
}
