//! Progress and status reporting for installations
//!
//! The copy engine and orchestrator report through an explicit
//! `ProgressSink` instead of sharing terminal cursor state. The engine
//! decides *when* a copy redraw happens; sinks only render what they are
//! handed.

use std::path::Path;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::InstallError;

pub trait ProgressSink {
    /// Step banner ("Step 2: Copying files...").
    fn section(&mut self, message: &str);
    /// Indented status detail.
    fn info(&mut self, message: &str);
    fn success(&mut self, message: &str);
    fn warn(&mut self, message: &str);

    /// A tree copy started; `total` is the pre-scanned node count.
    fn copy_started(&mut self, label: &str, total: usize);
    /// Called on the engine's throttled cadence only.
    fn copy_progress(&mut self, label: &str, percent: usize, copied: usize, total: usize);
    fn copy_finished(&mut self, label: &str, copied: usize, total: usize);
    /// Source tree absent; nothing to do.
    fn copy_skipped(&mut self, label: &str);
    fn copy_failed(&mut self, label: &str, error: &InstallError, src: &Path, dst: &Path);
}

/// Renders to the terminal with a progress bar per copied tree.
pub struct ConsoleSink {
    bar: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn drop_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleSink {
    fn section(&mut self, message: &str) {
        self.drop_bar();
        println!("{}", Style::new().yellow().bold().apply_to(message));
    }

    fn info(&mut self, message: &str) {
        println!("  {}", Style::new().cyan().apply_to(message));
    }

    fn success(&mut self, message: &str) {
        println!("  {}", Style::new().green().apply_to(message));
    }

    fn warn(&mut self, message: &str) {
        println!("  {}", Style::new().yellow().apply_to(message));
    }

    fn copy_started(&mut self, label: &str, total: usize) {
        let style = ProgressStyle::default_bar()
            .template("  Copying: {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("#>-");

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar.set_message(label.to_string());
        self.bar = Some(bar);
    }

    fn copy_progress(&mut self, _label: &str, _percent: usize, copied: usize, _total: usize) {
        if let Some(bar) = &self.bar {
            bar.set_position(copied as u64);
        }
    }

    fn copy_finished(&mut self, label: &str, copied: usize, total: usize) {
        self.drop_bar();
        println!(
            "  {}",
            Style::new()
                .green()
                .apply_to(format!("Copying: {label} [100%] ({copied}/{total}) - done"))
        );
    }

    fn copy_skipped(&mut self, label: &str) {
        println!(
            "  {}",
            Style::new()
                .yellow()
                .apply_to(format!("Skipping: {label} (not found)"))
        );
    }

    fn copy_failed(&mut self, label: &str, error: &InstallError, src: &Path, dst: &Path) {
        self.drop_bar();
        let red = Style::new().red();
        println!("  {}", red.apply_to(format!("Copying: {label} - failed")));
        println!("  {}", red.apply_to(format!("Error: {error}")));
        println!("  {}", red.apply_to(format!("Source: {}", src.display())));
        println!("  {}", red.apply_to(format!("Target: {}", dst.display())));
    }
}

/// Records every event as a line; lets tests assert ordering and cadence.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, needle: &str) -> bool {
        self.events.iter().any(|event| event.contains(needle))
    }
}

#[cfg(test)]
impl ProgressSink for RecordingSink {
    fn section(&mut self, message: &str) {
        self.events.push(format!("section: {message}"));
    }

    fn info(&mut self, message: &str) {
        self.events.push(format!("info: {message}"));
    }

    fn success(&mut self, message: &str) {
        self.events.push(format!("success: {message}"));
    }

    fn warn(&mut self, message: &str) {
        self.events.push(format!("warn: {message}"));
    }

    fn copy_started(&mut self, label: &str, total: usize) {
        self.events.push(format!("started: {label} total={total}"));
    }

    fn copy_progress(&mut self, label: &str, percent: usize, copied: usize, total: usize) {
        self.events
            .push(format!("progress: {label} {percent}% {copied}/{total}"));
    }

    fn copy_finished(&mut self, label: &str, copied: usize, total: usize) {
        self.events
            .push(format!("finished: {label} {copied}/{total}"));
    }

    fn copy_skipped(&mut self, label: &str) {
        self.events.push(format!("skipped: {label}"));
    }

    fn copy_failed(&mut self, label: &str, error: &InstallError, _src: &Path, _dst: &Path) {
        self.events.push(format!("failed: {label} ({error})"));
    }
}
