// Wed Jan 15 2026 - Alex

use crate::memory::Address;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a signature search runs.
pub struct ScanProgress {
    spinner: ProgressBar,
    found: usize,
}

impl ScanProgress {
    pub fn new(message: &str, enabled: bool) -> Self {
        let spinner = ProgressBar::new_spinner();
        if enabled {
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} [{elapsed}] {msg}") {
                spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
            }
            spinner.enable_steady_tick(Duration::from_millis(80));
        } else {
            spinner.set_draw_target(ProgressDrawTarget::hidden());
        }
        spinner.set_message(message.to_string());

        Self { spinner, found: 0 }
    }

    pub fn hidden() -> Self {
        Self::new("", false)
    }

    pub fn found(&self) -> usize {
        self.found
    }

    pub fn record_match(&mut self, address: Address) {
        self.found += 1;
        self.spinner
            .set_message(format!("{} match(es), last at {}", self.found, address));
    }

    /// Runs `f` with the bar suspended so log lines are not overdrawn.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.spinner.suspend(f)
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for ScanProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
