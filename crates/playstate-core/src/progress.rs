use std::collections::BTreeMap;
use tracing::{info, warn};
use crate::reconcile::RestoreSummary;

/// Counts restore outcomes and logs periodic progress.
///
/// Progress lines go to the log every `progress_interval` records so large
/// restores stay readable; the final tally becomes a [`RestoreSummary`].
pub struct ProgressTracker {
    total: usize,
    applied: usize,
    unmatched: usize,
    write_failures: usize,
    start_time: std::time::Instant,
    progress_interval: usize,
    last_progress_log: usize,
    error_counts: BTreeMap<String, usize>,
}

impl ProgressTracker {
    pub fn new(total: usize, progress_interval: usize) -> Self {
        if total > 10 {
            info!("Starting restore: {} records to process", total);
        }
        Self {
            total,
            applied: 0,
            unmatched: 0,
            write_failures: 0,
            start_time: std::time::Instant::now(),
            progress_interval: progress_interval.max(1),
            last_progress_log: 0,
            error_counts: BTreeMap::new(),
        }
    }

    pub fn record_applied(&mut self) {
        self.applied += 1;
    }

    pub fn record_unmatched(&mut self) {
        self.unmatched += 1;
    }

    /// Count a rejected write, grouped by error category for the summary
    pub fn record_write_failure(&mut self, error_category: &str) {
        self.write_failures += 1;
        *self.error_counts.entry(error_category.to_string()).or_insert(0) += 1;
    }

    pub fn failed(&self) -> usize {
        self.unmatched + self.write_failures
    }

    /// Log progress if the interval has been reached.
    ///
    /// `current` is 1-based (index + 1).
    pub fn log_progress(&mut self, current: usize) {
        if current - self.last_progress_log >= self.progress_interval || current == self.total {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let rate = if elapsed > 0.0 { current as f64 / elapsed } else { 0.0 };
            info!(
                "Progress: {}/{} ({:.1} records/sec) | Applied: {} | Unmatched: {} | Write failures: {}",
                current, self.total, rate, self.applied, self.unmatched, self.write_failures
            );
            self.last_progress_log = current;
        }
    }

    pub fn log_summary(&self, operation_name: &str) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if self.failed() > 0 {
            warn!(
                "{} completed: {} total in {:.1}s | Applied: {} | Unmatched: {} | Write failures: {}",
                operation_name, self.total, elapsed, self.applied, self.unmatched, self.write_failures
            );

            if !self.error_counts.is_empty() {
                let mut error_entries: Vec<_> = self.error_counts.iter().collect();
                error_entries.sort_by(|a, b| b.1.cmp(a.1));
                let error_summary: Vec<String> = error_entries
                    .iter()
                    .map(|(category, count)| format!("{}: {}", category, count))
                    .collect();
                info!("Write failure breakdown: {}", error_summary.join(", "));
            }
        } else {
            info!(
                "{} completed: {} total in {:.1}s | Applied: {}",
                operation_name, self.total, elapsed, self.applied
            );
        }
    }

    pub fn into_summary(self, dry_run: bool) -> RestoreSummary {
        RestoreSummary {
            total: self.total,
            applied: self.applied,
            unmatched: self.unmatched,
            write_failures: self.write_failures,
            write_failure_kinds: self.error_counts,
            dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_roll_into_summary() {
        let mut tracker = ProgressTracker::new(4, 2);
        tracker.record_applied();
        tracker.record_unmatched();
        tracker.record_write_failure("HTTP 500");
        tracker.record_write_failure("HTTP 500");
        tracker.log_progress(4);

        assert_eq!(tracker.failed(), 3);
        let summary = tracker.into_summary(false);
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.failed(), 3);
        assert_eq!(summary.write_failure_kinds.get("HTTP 500"), Some(&2));
    }
}
