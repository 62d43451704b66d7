//! Best-effort progress notification.
//!
//! Observers are a callback, a bounded channel, or both. Channel delivery
//! never blocks: when the channel is full or its receiver is gone the update
//! is dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::mpsc::{SyncSender, TrySendError};
use std::sync::Arc;
use tracing::trace;

/// Rows between two row-scan progress updates.
pub const ROW_PROGRESS_INTERVAL: usize = 100;

/// One progress update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub phase: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sheet: String,
    pub current: usize,
    pub total: usize,
    /// Clamped to `0.0..=100.0`; zero when `total` is zero
    pub percent: f64,
}

impl ProgressInfo {
    /// Update for `current` of `total`; the percentage is derived.
    pub fn new(phase: &str, sheet: &str, current: usize, total: usize) -> Self {
        let percent = if total > 0 {
            (current as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            phase: phase.to_string(),
            sheet: sheet.to_string(),
            current,
            total,
            percent,
        }
    }
}

/// Callback observer.
pub type ProgressCallback = Arc<dyn Fn(&ProgressInfo) + Send + Sync>;

/// Progress reporter handed to the inspector. The default reports nothing.
#[derive(Clone, Default)]
pub struct Progress {
    callback: Option<ProgressCallback>,
    channel: Option<SyncSender<ProgressInfo>>,
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("callback", &self.callback.is_some())
            .field("channel", &self.channel.is_some())
            .finish()
    }
}

impl Progress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report through a callback
    #[must_use]
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressInfo) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Report through a bounded channel (`std::sync::mpsc::sync_channel`)
    #[must_use]
    pub fn with_channel(mut self, sender: SyncSender<ProgressInfo>) -> Self {
        self.channel = Some(sender);
        self
    }

    /// Whether any observer is attached
    pub fn is_enabled(&self) -> bool {
        self.callback.is_some() || self.channel.is_some()
    }

    /// Notify observers of a phase update.
    pub fn emit(&self, phase: &str, sheet: &str, current: usize, total: usize) {
        if !self.is_enabled() {
            return;
        }
        let info = ProgressInfo::new(phase, sheet, current, total);
        if let Some(callback) = &self.callback {
            callback(&info);
        }
        if let Some(sender) = &self.channel {
            match sender.try_send(info) {
                Ok(()) => {}
                Err(TrySendError::Full(info)) => {
                    trace!(phase = %info.phase, "progress channel full, update dropped");
                }
                Err(TrySendError::Disconnected(_)) => {}
            }
        }
    }

    /// Row-scan update, sent every [`ROW_PROGRESS_INTERVAL`] rows and at `total`.
    pub fn emit_rows(&self, phase: &str, sheet: &str, row: usize, total: usize) {
        if row % ROW_PROGRESS_INTERVAL == 0 || row == total {
            self.emit(phase, sheet, row, total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::sync_channel;
    use std::sync::Mutex;

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(ProgressInfo::new("p", "", 5, 10).percent, 50.0);
        assert_eq!(ProgressInfo::new("p", "", 15, 10).percent, 100.0);
        assert_eq!(ProgressInfo::new("p", "", 3, 0).percent, 0.0);
    }

    #[test]
    fn test_disabled_progress_is_noop() {
        let progress = Progress::new();
        assert!(!progress.is_enabled());
        progress.emit("phase", "Sheet1", 1, 2);
    }

    #[test]
    fn test_callback_receives_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new().with_callback(move |info| {
            sink.lock().unwrap().push((info.phase.clone(), info.current));
        });
        progress.emit("inspect_sheets", "", 0, 2);
        progress.emit("inspect_sheets", "A", 1, 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("inspect_sheets".to_string(), 0),
                ("inspect_sheets".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_full_channel_does_not_block() {
        let (tx, rx) = sync_channel(1);
        let progress = Progress::new().with_channel(tx);
        for i in 0..10 {
            progress.emit("scan_sheet_rows", "S", i, 10);
        }
        let received: Vec<ProgressInfo> = rx.try_iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].current, 0);
    }

    #[test]
    fn test_disconnected_channel_is_tolerated() {
        let (tx, rx) = sync_channel(4);
        drop(rx);
        Progress::new().with_channel(tx).emit("p", "", 1, 1);
    }

    #[test]
    fn test_emit_rows_interval() {
        let (tx, rx) = sync_channel(64);
        let progress = Progress::new().with_channel(tx);
        for row in 1..=250 {
            progress.emit_rows("scan", "S", row, 250);
        }
        let rows: Vec<usize> = rx.try_iter().map(|p| p.current).collect();
        assert_eq!(rows, vec![100, 200, 250]);
    }

    #[test]
    fn test_sheet_omitted_when_empty() {
        let json = serde_json::to_string(&ProgressInfo::new("p", "", 1, 2)).unwrap();
        assert!(!json.contains("sheet"));
    }
}
