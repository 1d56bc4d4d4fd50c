pub mod error;
pub mod jellyfin;
pub mod traits;
pub mod types;

pub use error::ServerError;
pub use jellyfin::{JellyfinHttpClient, JellyfinServer};
pub use traits::MediaServer;
pub use types::{ItemPage, ItemUserData, ServerItem};
