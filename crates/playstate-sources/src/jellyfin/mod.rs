pub mod api;
pub mod client;

pub use api::JellyfinHttpClient;
pub use client::JellyfinServer;
