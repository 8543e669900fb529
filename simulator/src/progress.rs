use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex};

use netterm::LogSink;

/// Prints console lines above the progress bar and keeps a copy for the
/// statistics. Clones share the copy.
#[derive(Clone)]
pub struct ProgressSink {
    bar: ProgressBar,
    lines: Arc<Mutex<Vec<String>>>,
}

impl ProgressSink {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar, lines: Arc::new(Mutex::new(Vec::new())) }
    }

    /// Lines received since the last clear
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|lines| lines.clone()).unwrap_or_default()
    }
}

impl LogSink for ProgressSink {
    fn append_line(&mut self, line: &str) {
        self.bar.println(line);
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }

    fn clear(&mut self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

/// A bar counting run time in tenths of a second
pub fn run_progress_bar(duration_secs: f64) -> ProgressBar {
    let bar = ProgressBar::new((duration_secs * 10.0).ceil() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {msg}") {
        bar.set_style(style.progress_chars("##-"));
    }
    bar
}
