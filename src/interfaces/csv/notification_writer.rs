use crate::domain::notification::Outcome;
use crate::domain::ports::NotificationSink;
use crate::domain::work::OriginRef;
use crate::error::{FaucetError, Result};
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;
use tracing::warn;

#[derive(Debug, Serialize)]
struct NotificationRow<'a> {
    origin: &'a str,
    outcome: Outcome,
    message: &'a str,
}

/// Writes each notification as an `origin,outcome,message` CSV row.
///
/// Rows are flushed as they are written. Write failures are logged and
/// otherwise ignored so they never reach the batch worker.
pub struct CsvNotificationSink<W: Write> {
    writer: Mutex<csv::Writer<W>>,
}

impl<W: Write> CsvNotificationSink<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: Mutex::new(csv::Writer::from_writer(sink)),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        let writer = self
            .writer
            .into_inner()
            .map_err(|_| FaucetError::IoError(std::io::Error::other("notification writer poisoned")))?;
        writer
            .into_inner()
            .map_err(|e| FaucetError::IoError(e.into_error()))
    }
}

impl<W: Write + Send> NotificationSink for CsvNotificationSink<W> {
    fn notify(&self, origin: &OriginRef, outcome: Outcome, message: &str) {
        let Ok(mut writer) = self.writer.lock() else {
            warn!(origin = %origin, "Notification writer poisoned, dropping notification");
            return;
        };

        let row = NotificationRow {
            origin: origin.as_str(),
            outcome,
            message,
        };
        if let Err(e) = writer.serialize(row) {
            warn!(origin = %origin, error = %e, "Failed to write notification");
            return;
        }
        if let Err(e) = writer.flush() {
            warn!(origin = %origin, error = %e, "Failed to flush notification");
        }
    }
}
