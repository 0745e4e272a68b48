use indicatif::{ProgressBar, ProgressStyle};
use meta_duper_core::ProgressReporter;
use std::cell::RefCell;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Extraction phase: bar over all candidates
/// - Sizing phase: bar over duplicate clusters
pub struct CliReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: RefCell::new(None),
        }
    }

    fn start_bar(&self, total: usize, label: &str) {
        let style = ProgressStyle::with_template(&format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}}",
            label
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS);

        let pb = ProgressBar::new(total as u64);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        if let Some(old) = self.bar.replace(Some(pb)) {
            old.finish_and_clear();
        }
    }

    fn set_position(&self, done: usize) {
        if let Some(pb) = self.bar.borrow().as_ref() {
            pb.set_position(done as u64);
        }
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_extract_start(&self, total: usize) {
        self.start_bar(total, "Reading sidecars");
    }

    fn on_extract_progress(&self, done: usize, _total: usize) {
        self.set_position(done);
    }

    fn on_extract_complete(&self, sidecars: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Metadata read: {} usable sidecars in {:.2}s",
            sidecars, duration_secs
        );
    }

    fn on_match_complete(&self, groups: usize, clusters: usize) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Matching complete: {} groups merged into {} clusters",
            groups, clusters
        );
    }

    fn on_size_start(&self, clusters: usize) {
        self.start_bar(clusters, "Comparing sizes");
    }

    fn on_size_progress(&self, done: usize, _total: usize) {
        self.set_position(done);
    }

    fn on_size_complete(&self, lookups: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Size comparison complete: {} files sized in {:.2}s",
            lookups, duration_secs
        );
    }
}
