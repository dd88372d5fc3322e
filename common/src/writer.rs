//! Single writer thread in front of [`FrameLog`].
//!
//! Position-change events arrive on the media library's streaming thread.
//! They are pushed into a bounded queue and written by one dedicated thread,
//! so the log file has exactly one owner and lines never interleave.

use crate::{FrameLog, FrameRecord, LogError};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

enum LogMessage {
    Record(FrameRecord),
    Shutdown,
}

/// Cloneable producer side of the frame log queue.
#[derive(Clone)]
pub struct FrameLogHandle {
    tx: mpsc::Sender<LogMessage>,
    dropped: Arc<AtomicU64>,
}

impl FrameLogHandle {
    /// Queue a record without blocking.
    ///
    /// Returns `false` when the queue is full or the writer has stopped; the
    /// record is then dropped and counted.
    pub fn submit(&self, record: FrameRecord) -> bool {
        match self.tx.try_send(LogMessage::Record(record)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                if dropped.is_power_of_two() {
                    log::warn!("Frame log queue full, {} records dropped so far", dropped);
                }
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::trace!("Frame log writer stopped, record dropped");
                false
            }
        }
    }

    /// Number of records dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Owns the writer thread.
pub struct FrameLogWriter {
    handle: FrameLogHandle,
    thread: Option<JoinHandle<u64>>,
}

impl FrameLogWriter {
    /// Start the writer thread with a queue of `capacity` records.
    pub fn spawn(mut log: FrameLog, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel(capacity.max(1));

        let thread = thread::Builder::new()
            .name("frame-log-writer".to_string())
            .spawn(move || {
                let mut written = 0u64;
                let mut failed = 0u64;

                while let Some(message) = rx.blocking_recv() {
                    match message {
                        LogMessage::Record(record) => {
                            if log.write(&record.to_string()).is_written() {
                                written += 1;
                            } else {
                                failed += 1;
                            }
                        }
                        LogMessage::Shutdown => break,
                    }
                }

                log::info!(
                    "Frame log writer stopped ({} lines written, {} failed) for {}",
                    written,
                    failed,
                    log.path().display()
                );
                written
            });

        let thread = match thread {
            Ok(thread) => Some(thread),
            Err(e) => {
                log::error!("Failed to start frame log writer: {}", e);
                None
            }
        };

        Self {
            handle: FrameLogHandle {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            thread,
        }
    }

    /// Producer handle for media callbacks.
    pub fn handle(&self) -> FrameLogHandle {
        self.handle.clone()
    }

    /// Stop the writer after it drains queued records.
    ///
    /// Returns the number of lines written.
    pub fn shutdown(mut self) -> Result<u64, LogError> {
        let thread = self.thread.take().ok_or(LogError::QueueClosed)?;
        self.handle
            .tx
            .blocking_send(LogMessage::Shutdown)
            .map_err(|_| LogError::QueueClosed)?;
        thread.join().map_err(|_| LogError::QueueClosed)
    }
}

impl Drop for FrameLogWriter {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take()
            && self.handle.tx.blocking_send(LogMessage::Shutdown).is_ok()
        {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_records_are_written_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let base = format!("{}/movielog_", dir.path().display());
        let log = FrameLog::open(base, ".txt", "S01").unwrap();
        let path = log.path().to_path_buf();

        let writer = FrameLogWriter::spawn(log, 16);
        let handle = writer.handle();
        for i in 0..5 {
            assert!(handle.submit(FrameRecord::new("m.mp4", i as f64 / 10.0, 1.0)));
        }
        assert_eq!(writer.shutdown().unwrap(), 5);

        let contents = fs::read_to_string(path).unwrap();
        let positions: Vec<&str> = contents
            .lines()
            .filter(|l| !l.starts_with('#'))
            .map(|l| l.split(' ').nth(4).unwrap())
            .collect();
        assert_eq!(
            positions,
            vec!["0", "0.1", "0.2", "0.3", "0.4"]
        );
    }

    #[test]
    fn test_submit_after_shutdown_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let base = format!("{}/movielog_", dir.path().display());
        let log = FrameLog::open(base, ".txt", "").unwrap();

        let writer = FrameLogWriter::spawn(log, 4);
        let handle = writer.handle();
        writer.shutdown().unwrap();

        assert!(!handle.submit(FrameRecord::new("m.mp4", 0.5, 1.0)));
        assert_eq!(handle.dropped(), 1);
    }
}
