/// Trait for reporting pipeline progress.
///
/// The CLI implements it with indicatif spinners and bars. All methods have
/// default no-op implementations.
pub trait ProgressReporter {
    fn on_extract_start(&self, _total: usize) {}
    fn on_extract_progress(&self, _done: usize, _total: usize) {}
    fn on_extract_complete(&self, _sidecars: usize, _duration_secs: f64) {}
    fn on_match_complete(&self, _groups: usize, _clusters: usize) {}
    fn on_size_start(&self, _clusters: usize) {}
    fn on_size_progress(&self, _done: usize, _total: usize) {}
    fn on_size_complete(&self, _lookups: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
