use crate::output::Output;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner or bar on an interactive terminal, hidden everywhere else.
///
/// When hidden, the library's own progress logging in the durable log is the
/// only record of how far a run got.
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    pub fn spinner(output: &Output, msg: impl Into<String>) -> Self {
        let bar = if show_progress(output) {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(msg.into());
        Self { bar }
    }

    pub fn bar(output: &Output, len: u64, msg: impl Into<String>) -> Self {
        let bar = if show_progress(output) {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            pb
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(msg.into());
        Self { bar }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Track a total that is only known once the first response arrives
    pub fn set_progress(&self, current: u64, total: u64) {
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
        }
        self.bar.set_position(current);
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn show_progress(output: &Output) -> bool {
    output.is_human() && is_interactive()
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
