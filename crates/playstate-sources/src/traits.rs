use async_trait::async_trait;
use playstate_models::{User, UserDataUpdate};
use crate::error::ServerError;
use crate::types::{ItemPage, ServerItem};

/// Read/write surface of a media server used by export and restore.
///
/// Every call is awaited to completion before the next one is issued.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// Human-readable identity of the server (its base URL)
    fn server_name(&self) -> &str;

    /// `GET /Users`
    async fn get_users(&self) -> Result<Vec<User>, ServerError>;

    /// Played items for one user, with embedded user data and provider ids
    async fn get_played_items(&self, user_id: &str, limit: u32) -> Result<Vec<ServerItem>, ServerError>;

    /// One page of movies and episodes with provider ids only
    async fn get_catalog_page(&self, start_index: usize, limit: usize) -> Result<ItemPage, ServerError>;

    /// Overwrite one user's state for one item; any non-2xx answer is an error
    async fn update_user_data(
        &self,
        user_id: &str,
        item_id: &str,
        update: &UserDataUpdate,
    ) -> Result<(), ServerError>;
}
