use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use async_trait::async_trait;
use playstate_config::Config;
use playstate_models::{ExternalIds, MediaKind, PlaybackRecord, User, UserDataUpdate};
use playstate_sources::{ItemPage, ItemUserData, MediaServer, ServerError, ServerItem};
use crate::context::RunContext;

pub fn test_context() -> RunContext {
    RunContext::restore(&Config::default())
}

pub fn catalog_item(id: &str, imdb: Option<&str>, tmdb: Option<&str>, tvdb: Option<&str>) -> ServerItem {
    ServerItem {
        id: id.to_string(),
        name: format!("Item {}", id),
        kind: MediaKind::Movie,
        external_ids: ExternalIds::from_raw(
            imdb.map(str::to_string),
            tmdb.map(str::to_string),
            tvdb.map(str::to_string),
        ),
        user_data: None,
    }
}

pub fn record_with_ids(imdb: Option<&str>, tmdb: Option<&str>, tvdb: Option<&str>) -> PlaybackRecord {
    PlaybackRecord {
        source_user_id: "source-user".to_string(),
        source_username: "alice".to_string(),
        source_item_id: "source-item".to_string(),
        item_name: "Some Title".to_string(),
        item_type: MediaKind::Movie,
        play_count: 1,
        playback_position_ticks: 0,
        is_favorite: false,
        played: true,
        last_played_date: Some("2024-01-01T00:00:00.0000000Z".to_string()),
        external_ids: ExternalIds::from_raw(
            imdb.map(str::to_string),
            tmdb.map(str::to_string),
            tvdb.map(str::to_string),
        ),
    }
}

/// In-memory media server that records every call it receives
#[derive(Default)]
pub struct FakeServer {
    users: Vec<User>,
    users_fail: bool,
    /// `None` slots stand for items the server returns without an id
    catalog: Vec<Option<ServerItem>>,
    reported_total: Option<usize>,
    failing_pages: HashSet<usize>,
    played: HashMap<String, Vec<ServerItem>>,
    failing_played: HashSet<String>,
    failing_writes: HashSet<String>,
    timing_out_writes: HashSet<String>,
    catalog_requests: Mutex<Vec<(usize, usize)>>,
    writes: Mutex<Vec<(String, String, UserDataUpdate)>>,
    state: Mutex<HashMap<(String, String), ItemUserData>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn failing_users(mut self) -> Self {
        self.users_fail = true;
        self
    }

    pub fn with_catalog(mut self, items: Vec<ServerItem>) -> Self {
        self.catalog = items.into_iter().map(Some).collect();
        self
    }

    /// Put `count` id-less items at the front of the catalog
    pub fn with_unusable_items(mut self, count: usize) -> Self {
        let mut catalog = vec![None; count];
        catalog.append(&mut self.catalog);
        self.catalog = catalog;
        self
    }

    /// Report a total that differs from the real catalog size
    pub fn with_reported_total(mut self, total: usize) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Fail the catalog request for the given 0-based page
    pub fn failing_catalog_page(mut self, page: usize) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn with_played_items(mut self, user_id: &str, items: Vec<ServerItem>) -> Self {
        self.played.insert(user_id.to_string(), items);
        self
    }

    pub fn failing_played_items(mut self, user_id: &str) -> Self {
        self.failing_played.insert(user_id.to_string());
        self
    }

    /// Reject writes to the given target item id
    pub fn failing_write(mut self, item_id: &str) -> Self {
        self.failing_writes.insert(item_id.to_string());
        self
    }

    /// Let writes to the given target item run into the request timeout
    pub fn timing_out_write(mut self, item_id: &str) -> Self {
        self.timing_out_writes.insert(item_id.to_string());
        self
    }

    pub fn catalog_requests(&self) -> Vec<(usize, usize)> {
        self.catalog_requests.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(String, String, UserDataUpdate)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn user_data(&self, user_id: &str, item_id: &str) -> Option<ItemUserData> {
        self.state
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), item_id.to_string()))
            .cloned()
    }

    fn status_error(path: String) -> ServerError {
        ServerError::Status { status: 500, url: format!("http://fake{}", path) }
    }
}

#[async_trait]
impl MediaServer for FakeServer {
    fn server_name(&self) -> &str {
        "http://fake"
    }

    async fn get_users(&self) -> Result<Vec<User>, ServerError> {
        if self.users_fail {
            return Err(Self::status_error("/Users".to_string()));
        }
        Ok(self.users.clone())
    }

    async fn get_played_items(&self, user_id: &str, limit: u32) -> Result<Vec<ServerItem>, ServerError> {
        if self.failing_played.contains(user_id) {
            return Err(Self::status_error(format!("/Users/{}/Items", user_id)));
        }
        Ok(self
            .played
            .get(user_id)
            .map(|items| items.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_catalog_page(&self, start_index: usize, limit: usize) -> Result<ItemPage, ServerError> {
        self.catalog_requests.lock().unwrap().push((start_index, limit));
        if self.failing_pages.contains(&(start_index / limit.max(1))) {
            return Err(Self::status_error("/Items".to_string()));
        }
        let slots: Vec<&Option<ServerItem>> = self.catalog.iter().skip(start_index).take(limit).collect();
        Ok(ItemPage {
            returned: slots.len(),
            items: slots.into_iter().flatten().cloned().collect(),
            total_record_count: self.reported_total.unwrap_or(self.catalog.len()),
        })
    }

    async fn update_user_data(
        &self,
        user_id: &str,
        item_id: &str,
        update: &UserDataUpdate,
    ) -> Result<(), ServerError> {
        self.writes
            .lock()
            .unwrap()
            .push((user_id.to_string(), item_id.to_string(), update.clone()));
        if self.timing_out_writes.contains(item_id) {
            return Err(ServerError::Timeout {
                url: format!("http://fake/Users/{}/Items/{}/UserData", user_id, item_id),
            });
        }
        if self.failing_writes.contains(item_id) {
            return Err(Self::status_error(format!("/Users/{}/Items/{}/UserData", user_id, item_id)));
        }

        let mut state = self.state.lock().unwrap();
        let entry = state
            .entry((user_id.to_string(), item_id.to_string()))
            .or_default();
        entry.playback_position_ticks = update.playback_position_ticks;
        entry.play_count = update.play_count;
        entry.is_favorite = update.is_favorite;
        entry.played = update.played;
        if let Some(date) = &update.last_played_date {
            entry.last_played_date = Some(date.clone());
        }
        Ok(())
    }
}
