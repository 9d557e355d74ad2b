pub mod app_settings;
pub mod app_state;
pub mod cache;
pub mod messages;
pub mod network;
pub mod postseason;
pub mod tactics;
