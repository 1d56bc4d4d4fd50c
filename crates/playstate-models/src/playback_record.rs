use serde::{Deserialize, Serialize};
use crate::external_ids::ExternalIds;
use crate::media::MediaKind;

/// Per-user playback state for one item, in portable backup form.
///
/// Field names follow the backup file schema. `source_item_id` is the
/// origin server's internal id and is kept for diagnostics only: internal
/// ids are instance-local and never reused on another server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackRecord {
    #[serde(rename = "UserId", default)]
    pub source_user_id: String,
    #[serde(rename = "Username", default)]
    pub source_username: String,
    #[serde(rename = "ItemId", default)]
    pub source_item_id: String,
    #[serde(rename = "ItemName", default)]
    pub item_name: String,
    #[serde(rename = "ItemType", default)]
    pub item_type: MediaKind,
    #[serde(rename = "PlayCount", default)]
    pub play_count: u32,
    #[serde(rename = "PlaybackPositionTicks", default)]
    pub playback_position_ticks: u64,
    #[serde(rename = "IsFavorite", default)]
    pub is_favorite: bool,
    #[serde(rename = "Played", default)]
    pub played: bool,
    /// Opaque server timestamp, passed through verbatim
    #[serde(rename = "LastPlayedDate", default)]
    pub last_played_date: Option<String>,
    #[serde(flatten)]
    pub external_ids: ExternalIds,
}

impl PlaybackRecord {
    /// A record without any external id can never be matched on another server
    pub fn is_resolvable(&self) -> bool {
        !self.external_ids.is_empty()
    }

    pub fn display_name(&self) -> &str {
        if self.item_name.is_empty() {
            "Unknown Item"
        } else {
            &self.item_name
        }
    }
}
