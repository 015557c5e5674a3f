pub mod config;
pub mod discord;

pub use config::Settings;
