use super::connection::{self, ConnectionArgs};
use super::progress::RunProgress;
use crate::output::Output;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use playstate_config::PathManager;
use playstate_core::{export_playback_with_progress, save_backup, CoreError, ExportSummary, RunContext};
use std::path::{Path, PathBuf};
use tracing::Instrument;

pub struct BackupArgs {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub file: Option<PathBuf>,
    pub limit: Option<u32>,
    pub dry_run: bool,
}

pub async fn run_backup(args: BackupArgs, output: &Output) -> Result<()> {
    tracing::debug!("Backup command started");

    let paths = PathManager::default();
    let mut config = connection::load_config(&paths)?;
    if let Some(limit) = args.limit.filter(|l| *l > 0) {
        config.export.played_items_limit = limit;
    }

    let server = connection::connect(
        &config,
        &paths,
        ConnectionArgs { url: args.url, api_key: args.api_key },
        output,
    )?;
    let file = connection::resolve_backup_file(&config, args.file)?;
    let ctx = RunContext::export(&config).with_dry_run(args.dry_run);

    let progress = RunProgress::spinner(output, "Fetching users...");
    let result = export_playback_with_progress(&server, &ctx, |user, position, total| {
        progress.set_message(format!("Fetching played items for {} ({}/{})", user.name, position, total));
    })
    .instrument(ctx.span().clone())
    .await;
    progress.finish();

    let export = match result {
        Ok(export) => export,
        Err(CoreError::NoUsers { server }) => {
            output.warn(format!("No users found on {}. Nothing to back up.", server));
            return Ok(());
        }
        Err(e) => return Err(e).wrap_err("Backup failed"),
    };

    for name in &export.summary.users_failed {
        output.warn(format!("Could not fetch played items for user '{}'. See the log for details.", name));
    }

    if ctx.dry_run {
        output.info(format!("Dry run: {} not written", file.display()));
    } else {
        let span = ctx.span().clone();
        let _entered = span.enter();
        save_backup(&file, &export.records).wrap_err("Backup failed")?;
    }

    print_summary(output, &export.summary, &file, ctx.dry_run);
    tracing::info!(
        elapsed_ms = ctx.elapsed().num_milliseconds(),
        records = export.summary.records,
        "Backup finished"
    );
    Ok(())
}

fn print_summary(output: &Output, summary: &ExportSummary, file: &Path, dry_run: bool) {
    let mut rows = vec![
        ("Users", summary.users_total.to_string()),
        ("Users exported", summary.users_exported.to_string()),
        ("Users failed", summary.users_failed.len().to_string()),
        ("Users skipped", summary.users_incomplete.to_string()),
        ("Records", summary.records.to_string()),
        ("File", file.display().to_string()),
    ];
    if dry_run {
        rows.push(("Dry run", "yes".to_string()));
    }
    output.summary("Backup Summary", &rows);

    if !dry_run {
        output.success(format!("Exported {} records to {}", summary.records, file.display()));
    }
}
