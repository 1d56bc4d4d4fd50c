use serde::Serialize;
use crate::playback_record::PlaybackRecord;

/// Body of a per-user, per-item user-data write.
///
/// `LastPlayedDate` is left out of the JSON entirely when the backup did not
/// capture one, so the target keeps whatever value it already has.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserDataUpdate {
    #[serde(rename = "PlaybackPositionTicks")]
    pub playback_position_ticks: u64,
    #[serde(rename = "PlayCount")]
    pub play_count: u32,
    #[serde(rename = "IsFavorite")]
    pub is_favorite: bool,
    #[serde(rename = "Played")]
    pub played: bool,
    #[serde(rename = "LastPlayedDate", skip_serializing_if = "Option::is_none")]
    pub last_played_date: Option<String>,
}

impl From<&PlaybackRecord> for UserDataUpdate {
    fn from(record: &PlaybackRecord) -> Self {
        Self {
            playback_position_ticks: record.playback_position_ticks,
            play_count: record.play_count,
            is_favorite: record.is_favorite,
            played: record.played,
            last_played_date: record
                .last_played_date
                .clone()
                .filter(|date| !date.is_empty()),
        }
    }
}
