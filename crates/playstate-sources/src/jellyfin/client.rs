use crate::error::ServerError;
use crate::jellyfin::api::{
    BaseItemDto, ItemsResponse, JellyfinHttpClient, UserDataDto, UserDto, PLAYED_ITEM_FIELDS,
};
use crate::traits::MediaServer;
use crate::types::{ItemPage, ItemUserData, ServerItem};
use async_trait::async_trait;
use playstate_models::{ExternalIdSource, ExternalIds, MediaKind, User, UserDataUpdate};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// [`MediaServer`] backed by a live Jellyfin instance
pub struct JellyfinServer {
    http: JellyfinHttpClient,
}

impl JellyfinServer {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ServerError> {
        let http = JellyfinHttpClient::new(base_url, api_key, timeout)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl MediaServer for JellyfinServer {
    fn server_name(&self) -> &str {
        self.http.base_url()
    }

    async fn get_users(&self) -> Result<Vec<User>, ServerError> {
        let users: Vec<UserDto> = self.http.get_json("/Users", &[] as &[(&str, &str)]).await?;
        info!(count = users.len(), "Fetched users");
        Ok(users.into_iter().map(user_from_dto).collect())
    }

    async fn get_played_items(&self, user_id: &str, limit: u32) -> Result<Vec<ServerItem>, ServerError> {
        let response: ItemsResponse = self
            .http
            .get_json(&played_items_path(user_id), &played_items_query(limit))
            .await?;
        debug!(
            user_id,
            returned = response.items.len(),
            total = response.total_record_count,
            "Fetched played items"
        );
        Ok(page_from_response(response).items)
    }

    async fn get_catalog_page(&self, start_index: usize, limit: usize) -> Result<ItemPage, ServerError> {
        let response: ItemsResponse = self
            .http
            .get_json("/Items", &catalog_query(start_index, limit))
            .await?;
        Ok(page_from_response(response))
    }

    async fn update_user_data(
        &self,
        user_id: &str,
        item_id: &str,
        update: &UserDataUpdate,
    ) -> Result<(), ServerError> {
        self.http.post_json(&user_data_path(user_id, item_id), update).await
    }
}

/// `includeItemTypes` for the catalog scan, e.g. `Movie,Episode`
pub fn catalog_item_types() -> String {
    MediaKind::CATALOG_KINDS
        .iter()
        .map(MediaKind::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn played_items_path(user_id: &str) -> String {
    format!("/Users/{}/Items", urlencoding::encode(user_id))
}

/// Most recently played first, with the user data and provider ids embedded
pub fn played_items_query(limit: u32) -> Vec<(&'static str, String)> {
    vec![
        ("IsPlayed", "true".to_string()),
        ("Recursive", "true".to_string()),
        ("Fields", PLAYED_ITEM_FIELDS.to_string()),
        ("SortBy", "DatePlayed".to_string()),
        ("SortOrder", "Descending".to_string()),
        ("Limit", limit.to_string()),
    ]
}

pub fn catalog_query(start_index: usize, limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("recursive", "true".to_string()),
        ("fields", "ProviderIds".to_string()),
        ("includeItemTypes", catalog_item_types()),
        ("limit", limit.to_string()),
        ("startIndex", start_index.to_string()),
    ]
}

pub fn user_data_path(user_id: &str, item_id: &str) -> String {
    format!(
        "/Users/{}/Items/{}/UserData",
        urlencoding::encode(user_id),
        urlencoding::encode(item_id)
    )
}

fn user_from_dto(dto: UserDto) -> User {
    User {
        id: dto.id.unwrap_or_default(),
        name: dto.name.unwrap_or_default(),
    }
}

fn page_from_response(response: ItemsResponse) -> ItemPage {
    let returned = response.items.len();
    let items: Vec<ServerItem> = response.items.into_iter().filter_map(item_from_dto).collect();
    if items.len() < returned {
        warn!(
            dropped = returned - items.len(),
            "Skipping items without an Id in server response"
        );
    }
    ItemPage {
        items,
        returned,
        total_record_count: response.total_record_count,
    }
}

/// Items without an id are unusable on both sides of a sync
pub(crate) fn item_from_dto(dto: BaseItemDto) -> Option<ServerItem> {
    let id = dto.id.filter(|id| !id.is_empty())?;
    Some(ServerItem {
        id,
        name: dto.name.unwrap_or_default(),
        kind: dto.item_type.map(MediaKind::from).unwrap_or_default(),
        external_ids: external_ids_from_providers(dto.provider_ids.as_ref()),
        user_data: dto.user_data.map(user_data_from_dto),
    })
}

fn external_ids_from_providers(providers: Option<&HashMap<String, Option<String>>>) -> ExternalIds {
    let Some(providers) = providers else {
        return ExternalIds::new();
    };
    let lookup = |source: ExternalIdSource| {
        providers
            .get(source.provider_key())
            .cloned()
            .flatten()
    };
    ExternalIds::from_raw(
        lookup(ExternalIdSource::Imdb),
        lookup(ExternalIdSource::Tmdb),
        lookup(ExternalIdSource::Tvdb),
    )
}

fn user_data_from_dto(dto: UserDataDto) -> ItemUserData {
    ItemUserData {
        playback_position_ticks: dto.playback_position_ticks.unwrap_or(0),
        play_count: dto.play_count.unwrap_or(0),
        is_favorite: dto.is_favorite.unwrap_or(false),
        played: dto.played.unwrap_or(false),
        last_played_date: dto.last_played_date,
    }
}
