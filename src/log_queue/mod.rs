//! The ordered queue of console lines between the producers (controller,
//! generator, deliver tasks) and the single drain task that feeds the sink.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;

use crate::clock::Timestamp;
use crate::display::LogSink;

pub mod drain;
pub use drain::LogDrain;

/// The sink shared by the drain task and `reset`
pub type SharedSink = Arc<Mutex<Box<dyn LogSink>>>;

/// A line waiting to be enqueued
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    /// Shown as `[HH:MM:SS.mmm]` in front of the text when present
    pub timestamp: Option<Timestamp>,
    pub text: String,
}

/// A line in the queue, numbered in enqueue order
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub seq: u64,
    pub line: LogLine,
}

impl LogLine {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { timestamp: None, text: text.into() }
    }

    pub fn stamped(timestamp: Timestamp, text: impl Into<String>) -> Self {
        Self { timestamp: Some(timestamp), text: text.into() }
    }

    pub fn render(&self) -> String {
        match &self.timestamp {
            Some(ts) => format!("[{}] {}", ts.format_millis(), self.text),
            None => self.text.clone(),
        }
    }
}

struct QueueState {
    entries: VecDeque<LogEntry>,
    next_seq: u64,
}

impl QueueState {
    fn push(&mut self, line: LogLine) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(LogEntry { seq, line });
        seq
    }
}

/// Unbounded FIFO of console lines with a single consumer
pub struct LogQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl LogQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState { entries: VecDeque::new(), next_seq: 0 }),
            notify: Notify::new(),
        }
    }

    /// Enqueue one line, returning its sequence number
    pub async fn push(&self, line: LogLine) -> u64 {
        let seq = self.state.lock().await.push(line);
        self.notify.notify_one();
        seq
    }

    /// Enqueue `lines` back to back unless `guard` is cancelled; all or nothing
    pub async fn push_all_if(&self, guard: &CancellationToken, lines: Vec<LogLine>) -> bool {
        {
            let mut state = self.state.lock().await;
            if guard.is_cancelled() {
                return false;
            }
            for line in lines {
                state.push(line);
            }
        }
        self.notify.notify_one();
        true
    }

    /// Wait up to `timeout` until the queue is non-empty
    pub async fn wait(&self, timeout: Duration) -> bool {
        let notified = self.notify.notified();
        if !self.is_empty().await {
            return true;
        }
        let _ = tokio::time::timeout(timeout, notified).await;
        !self.is_empty().await
    }

    /// Hand every queued line to `sink` in order, returning how many
    pub async fn flush_into(&self, sink: &mut dyn LogSink) -> usize {
        let mut state = self.state.lock().await;
        let count = state.entries.len();
        for entry in state.entries.drain(..) {
            sink.append_line(&entry.line.render());
        }
        count
    }

    /// Drop every queued line, returning how many were dropped
    pub async fn clear(&self) -> usize {
        let mut state = self.state.lock().await;
        let count = state.entries.len();
        state.entries.clear();
        count
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }
}

impl Default for LogQueue {
    fn default() -> Self {
        Self::new()
    }
}
