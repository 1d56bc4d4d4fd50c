pub mod external_ids;
pub mod media;
pub mod playback_record;
pub mod user;
pub mod user_data;

pub use external_ids::{ExternalIdSource, ExternalIds};
pub use media::MediaKind;
pub use playback_record::PlaybackRecord;
pub use user::User;
pub use user_data::UserDataUpdate;
