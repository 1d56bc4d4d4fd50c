use super::connection::{self, ConnectionArgs};
use super::progress::{is_interactive, RunProgress};
use super::prompts;
use crate::output::Output;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use playstate_config::PathManager;
use playstate_core::{
    apply_records_with_progress, backup_usernames, build_catalog_index_with_progress, find_user,
    load_backup, records_for_username, RestoreSummary, RunContext,
};
use playstate_models::User;
use playstate_sources::MediaServer;
use std::path::PathBuf;
use tracing::Instrument;

pub struct RestoreArgs {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub file: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub target_user: Option<String>,
    pub source_user: Option<String>,
    pub dry_run: bool,
}

pub async fn run_restore(args: RestoreArgs, output: &Output) -> Result<()> {
    tracing::debug!("Restore command started");

    let paths = PathManager::default();
    let config = connection::load_config(&paths)?;

    // The file is read before any network traffic so a bad path fails fast
    let file = connection::resolve_backup_file(&config, args.file)?;
    let records = load_backup(&file).wrap_err("Restore failed")?;
    if records.is_empty() {
        output.warn(format!("{} contains no records. Nothing to restore.", file.display()));
        return Ok(());
    }
    output.info(format!("Loaded {} records from {}", records.len(), file.display()));

    let server = connection::connect(
        &config,
        &paths,
        ConnectionArgs { url: args.url, api_key: args.api_key },
        output,
    )?;

    let mut ctx = RunContext::restore(&config).with_dry_run(args.dry_run);
    if let Some(page_size) = args.page_size {
        ctx = ctx.with_page_size(page_size);
    }
    let span = ctx.span().clone();

    let users: Vec<User> = server
        .get_users()
        .instrument(span.clone())
        .await
        .wrap_err_with(|| format!("Could not retrieve users from {}", server.server_name()))?
        .into_iter()
        .filter(User::is_complete)
        .collect();
    if users.is_empty() {
        output.warn("No users found on the target server.");
        return Ok(());
    }

    let Some(target) = select_target_user(output, &users, args.target_user)? else {
        output.warn("No target user selected. Nothing was restored.");
        return Ok(());
    };

    let usernames = backup_usernames(&records);
    let Some(source_username) = select_source_username(output, &usernames, args.source_user)? else {
        output.warn("No backup user selected. Nothing was restored.");
        return Ok(());
    };

    let selected = records_for_username(&records, &source_username);
    if selected.is_empty() {
        output.warn(format!("No records found for user '{}' in the backup.", source_username));
        return Ok(());
    }
    tracing::info!(
        parent: &span,
        target_user = %target.name,
        target_user_id = %target.id,
        source_username = %source_username,
        records = selected.len(),
        "Restoring backup user onto target user"
    );
    output.info(format!(
        "Restoring {} records from '{}' onto '{}'",
        selected.len(),
        source_username,
        target.name
    ));

    let indexing = RunProgress::bar(output, 0, "Indexing target catalog");
    let index = build_catalog_index_with_progress(&server, &ctx, |retrieved, total| {
        indexing.set_progress(retrieved as u64, total as u64);
    })
    .instrument(span.clone())
    .await;
    indexing.finish();
    let index = index.wrap_err("Restore aborted before any change was made")?;
    output.info(format!(
        "Indexed {} catalog items ({} external ids)",
        index.stats().items_retrieved,
        index.len()
    ));

    let applying = RunProgress::bar(output, selected.len() as u64, "Applying playback state");
    let summary = apply_records_with_progress(&server, &ctx, &target.id, &selected, &index, |record, outcome| {
        applying.set_message(record.display_name().to_string());
        if outcome.is_failure() {
            tracing::debug!(item = record.display_name(), ?outcome, "Record not restored");
        }
        applying.inc();
    })
    .instrument(span.clone())
    .await;
    applying.finish();

    print_summary(output, &summary, &target, &source_username);
    tracing::info!(
        parent: &span,
        elapsed_ms = ctx.elapsed().num_milliseconds(),
        applied = summary.applied,
        failed = summary.failed(),
        "Restore finished"
    );
    Ok(())
}

fn select_target_user<'a>(output: &Output, users: &'a [User], flag: Option<String>) -> Result<Option<&'a User>> {
    if let Some(needle) = flag {
        let found = find_user(users, &needle);
        if found.is_none() {
            output.warn(format!("Target user '{}' not found on the server.", needle));
        }
        return Ok(found);
    }
    require_interactive("--target-user")?;

    let entries: Vec<String> = users
        .iter()
        .map(|u| format!("Name: {}, ID: {}", u.name, u.id))
        .collect();
    let choice = prompts::select_from_list(output, "Select the target user:", &entries)?;
    Ok(choice.map(|idx| &users[idx]))
}

fn select_source_username(output: &Output, usernames: &[String], flag: Option<String>) -> Result<Option<String>> {
    if let Some(name) = flag {
        let found = usernames
            .iter()
            .find(|u| **u == name)
            .or_else(|| usernames.iter().find(|u| u.eq_ignore_ascii_case(&name)))
            .cloned();
        if found.is_none() {
            output.warn(format!("User '{}' does not appear in the backup file.", name));
        }
        return Ok(found);
    }
    if usernames.is_empty() {
        return Ok(None);
    }
    require_interactive("--source-user")?;

    let choice = prompts::select_from_list(output, "Select the user to restore from the backup:", usernames)?;
    Ok(choice.map(|idx| usernames[idx].clone()))
}

fn require_interactive(flag: &str) -> Result<()> {
    if is_interactive() {
        Ok(())
    } else {
        Err(eyre!("Not running in a terminal; pass {} to choose without a prompt", flag))
    }
}

fn print_summary(output: &Output, summary: &RestoreSummary, target: &User, source_username: &str) {
    let applied_label = if summary.dry_run { "Would apply" } else { "Applied" };
    let mut rows = vec![
        ("Backup user", source_username.to_string()),
        ("Target user", target.name.clone()),
        ("Records", summary.total.to_string()),
        (applied_label, summary.applied.to_string()),
        ("No match in target", summary.unmatched.to_string()),
        ("Write failures", summary.write_failures.to_string()),
        ("Total failed", summary.failed().to_string()),
    ];
    for (kind, count) in &summary.write_failure_kinds {
        rows.push(("Write failure", format!("{} x{}", kind, count)));
    }
    output.summary("Restore Summary", &rows);

    if summary.dry_run {
        output.info("Dry run: no playback state was written");
    } else if summary.failed() == 0 {
        output.success(format!("Restored {} items", summary.applied));
    } else {
        output.warn(format!(
            "Restored {} items, {} could not be restored. See the log for details.",
            summary.applied,
            summary.failed()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    fn quiet_output() -> Output {
        Output::new(OutputFormat::Human, true)
    }

    #[test]
    fn test_unknown_target_user_flag_stops_gracefully() {
        let users = vec![User::new("a1", "Alice"), User::new("b2", "bob")];

        let found = select_target_user(&quiet_output(), &users, Some("carol".to_string())).unwrap();
        assert!(found.is_none());

        let found = select_target_user(&quiet_output(), &users, Some("alice".to_string())).unwrap();
        assert_eq!(found.map(|u| u.id.as_str()), Some("a1"));
    }

    #[test]
    fn test_unknown_source_user_flag_stops_gracefully() {
        let usernames = vec!["alice".to_string(), "Bob".to_string()];

        let found = select_source_username(&quiet_output(), &usernames, Some("dave".to_string())).unwrap();
        assert_eq!(found, None);

        let found = select_source_username(&quiet_output(), &usernames, Some("bob".to_string())).unwrap();
        assert_eq!(found.as_deref(), Some("Bob"));
    }
}
