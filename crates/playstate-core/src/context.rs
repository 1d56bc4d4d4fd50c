use chrono::{DateTime, Utc};
use playstate_config::Config;
use std::fmt;

/// Which pipeline a run belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Export,
    Restore,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Export => f.write_str("export"),
            RunKind::Restore => f.write_str("restore"),
        }
    }
}

/// Settings and log scope for a single export or restore invocation.
///
/// Built once at the start of a run and handed to every component by
/// reference. Nothing here outlives the run.
#[derive(Debug, Clone)]
pub struct RunContext {
    kind: RunKind,
    started_at: DateTime<Utc>,
    span: tracing::Span,
    pub catalog_page_size: usize,
    pub played_items_limit: u32,
    pub dry_run: bool,
    /// Restore progress is logged every this many records
    pub progress_interval: usize,
}

impl RunContext {
    pub fn new(kind: RunKind, config: &Config) -> Self {
        let started_at = Utc::now();
        let run_id = started_at.format("%Y%m%dT%H%M%SZ").to_string();
        let span = tracing::info_span!("run", kind = %kind, run_id = %run_id);

        Self {
            kind,
            started_at,
            span,
            catalog_page_size: config.catalog.page_size.max(1),
            played_items_limit: config.export.played_items_limit.max(1),
            dry_run: false,
            progress_interval: 50,
        }
    }

    pub fn export(config: &Config) -> Self {
        Self::new(RunKind::Export, config)
    }

    pub fn restore(config: &Config) -> Self {
        Self::new(RunKind::Restore, config)
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.catalog_page_size = page_size.max(1);
        self
    }

    pub fn kind(&self) -> RunKind {
        self.kind
    }

    /// Span that every log line of this run should be recorded under
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_takes_limits_from_config() {
        let mut config = Config::default();
        config.catalog.page_size = 200;
        config.export.played_items_limit = 42;

        let ctx = RunContext::restore(&config);
        assert_eq!(ctx.kind(), RunKind::Restore);
        assert_eq!(ctx.catalog_page_size, 200);
        assert_eq!(ctx.played_items_limit, 42);
        assert!(!ctx.dry_run);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let ctx = RunContext::export(&Config::default()).with_page_size(0);
        assert_eq!(ctx.catalog_page_size, 1);
    }
}
