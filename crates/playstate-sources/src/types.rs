use playstate_models::{ExternalIds, MediaKind};

/// Per-user state embedded in an item when the server is asked for `UserData`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUserData {
    pub playback_position_ticks: u64,
    pub play_count: u32,
    pub is_favorite: bool,
    pub played: bool,
    pub last_played_date: Option<String>,
}

/// One catalog item as returned by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerItem {
    pub id: String,
    pub name: String,
    pub kind: MediaKind,
    pub external_ids: ExternalIds,
    pub user_data: Option<ItemUserData>,
}

/// One slice of a paginated item listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPage {
    pub items: Vec<ServerItem>,
    /// Items the server sent for this page, counting ones dropped for lacking an id
    pub returned: usize,
    /// Total the server claims to hold for the whole query, not just this page
    pub total_record_count: usize,
}
