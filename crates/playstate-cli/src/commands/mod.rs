pub mod backup;
pub mod config;
pub mod connection;
pub mod progress;
pub mod prompts;
pub mod restore;
