use playstate_models::{PlaybackRecord, User};
use playstate_sources::{MediaServer, ServerItem};
use serde::Serialize;
use tracing::{debug, error, info, warn};
use crate::context::RunContext;
use crate::error::CoreError;

/// What an export run did, per user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub users_total: usize,
    pub users_exported: usize,
    /// Users skipped because the server returned no id or no name
    pub users_incomplete: usize,
    /// Names of users whose played-items request failed
    pub users_failed: Vec<String>,
    pub records: usize,
}

#[derive(Debug, Clone)]
pub struct ExportResult {
    pub records: Vec<PlaybackRecord>,
    pub summary: ExportSummary,
}

/// Collect played items for every user on the server.
///
/// The user list is required; without it there is nothing to export. A
/// failed played-items request only costs that user's records and is
/// reported in the summary.
pub async fn export_playback<S>(server: &S, ctx: &RunContext) -> Result<ExportResult, CoreError>
where
    S: MediaServer + ?Sized,
{
    export_playback_with_progress(server, ctx, |_, _, _| {}).await
}

/// Same as [`export_playback`], calling `on_user(user, position, total)` before each user
pub async fn export_playback_with_progress<S, F>(
    server: &S,
    ctx: &RunContext,
    mut on_user: F,
) -> Result<ExportResult, CoreError>
where
    S: MediaServer + ?Sized,
    F: FnMut(&User, usize, usize),
{
    info!(server = server.server_name(), "Fetching users");
    let users = server.get_users().await.map_err(|e| {
        error!(error = %e, "Could not retrieve users from server");
        CoreError::UserListUnavailable {
            server: server.server_name().to_string(),
            source: e,
        }
    })?;

    if users.is_empty() {
        return Err(CoreError::NoUsers {
            server: server.server_name().to_string(),
        });
    }

    let mut summary = ExportSummary {
        users_total: users.len(),
        ..ExportSummary::default()
    };
    let mut records = Vec::new();

    for (position, user) in users.iter().enumerate() {
        if !user.is_complete() {
            warn!(user_id = %user.id, username = %user.name, "Skipping user with incomplete data");
            summary.users_incomplete += 1;
            continue;
        }

        on_user(user, position + 1, users.len());
        info!(username = %user.name, user_id = %user.id, "Fetching played items for user");

        let items = match server.get_played_items(&user.id, ctx.played_items_limit).await {
            Ok(items) => items,
            Err(e) => {
                error!(username = %user.name, user_id = %user.id, error = %e, "Error fetching played items");
                summary.users_failed.push(user.name.clone());
                continue;
            }
        };

        if items.len() as u64 >= u64::from(ctx.played_items_limit) {
            warn!(
                username = %user.name,
                limit = ctx.played_items_limit,
                "Played items reached the request limit, older entries may be missing"
            );
        }

        let before = records.len();
        records.extend(items.into_iter().map(|item| {
            debug!(item = %item.name, username = %user.name, "Adding item to backup");
            record_from_item(user, item)
        }));
        info!(username = %user.name, count = records.len() - before, "Collected played items");
        summary.users_exported += 1;
    }

    summary.records = records.len();
    info!(
        users = summary.users_exported,
        failed_users = summary.users_failed.len(),
        records = summary.records,
        "Export collection finished"
    );
    Ok(ExportResult { records, summary })
}

/// Flatten one played item into a portable record for `user`
pub fn record_from_item(user: &User, item: ServerItem) -> PlaybackRecord {
    let user_data = item.user_data.unwrap_or_default();
    PlaybackRecord {
        source_user_id: user.id.clone(),
        source_username: user.name.clone(),
        source_item_id: item.id,
        item_name: item.name,
        item_type: item.kind,
        play_count: user_data.play_count,
        playback_position_ticks: user_data.playback_position_ticks,
        is_favorite: user_data.is_favorite,
        played: user_data.played,
        last_played_date: user_data.last_played_date,
        external_ids: item.external_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog_item, test_context, FakeServer};
    use playstate_sources::ItemUserData;

    fn played(id: &str, imdb: &str, play_count: u32) -> ServerItem {
        let mut item = catalog_item(id, Some(imdb), None, None);
        item.user_data = Some(ItemUserData {
            playback_position_ticks: 0,
            play_count,
            is_favorite: false,
            played: true,
            last_played_date: Some("2024-02-10T19:30:00.0000000Z".to_string()),
        });
        item
    }

    #[tokio::test]
    async fn test_export_flattens_all_users() {
        let server = FakeServer::new()
            .with_users(vec![User::new("u1", "alice"), User::new("u2", "bob")])
            .with_played_items("u1", vec![played("a", "tt0000001", 1), played("b", "tt0000002", 3)])
            .with_played_items("u2", vec![played("c", "tt0000003", 2)]);

        let result = export_playback(&server, &test_context()).await.unwrap();

        assert_eq!(result.records.len(), 3);
        assert_eq!(result.summary.users_exported, 2);
        let bob = result.records.iter().find(|r| r.source_username == "bob").unwrap();
        assert_eq!(bob.source_user_id, "u2");
        assert_eq!(bob.source_item_id, "c");
        assert_eq!(bob.play_count, 2);
        assert_eq!(bob.last_played_date.as_deref(), Some("2024-02-10T19:30:00.0000000Z"));
    }

    #[tokio::test]
    async fn test_user_list_failure_is_fatal() {
        let server = FakeServer::new().failing_users();
        let result = export_playback(&server, &test_context()).await;
        assert!(matches!(result, Err(CoreError::UserListUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_no_users_is_reported() {
        let server = FakeServer::new();
        let result = export_playback(&server, &test_context()).await;
        assert!(matches!(result, Err(CoreError::NoUsers { .. })));
    }

    #[tokio::test]
    async fn test_failed_user_is_skipped_and_reported() {
        let server = FakeServer::new()
            .with_users(vec![User::new("u1", "alice"), User::new("u2", "bob"), User::new("", "ghost")])
            .failing_played_items("u1")
            .with_played_items("u2", vec![played("c", "tt0000003", 1)]);

        let result = export_playback(&server, &test_context()).await.unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.summary.users_failed, vec!["alice".to_string()]);
        assert_eq!(result.summary.users_incomplete, 1);
        assert_eq!(result.summary.users_exported, 1);
    }

    #[test]
    fn test_item_without_user_data_defaults() {
        let item = catalog_item("x", None, None, Some("81189"));
        let record = record_from_item(&User::new("u1", "alice"), item);
        assert_eq!(record.play_count, 0);
        assert!(!record.played);
        assert_eq!(record.last_played_date, None);
        assert_eq!(record.external_ids.tvdb.as_deref(), Some("81189"));
    }
}
