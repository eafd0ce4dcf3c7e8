//! CLI library for testing purposes

pub mod config_file;

pub use config_file::{ConfigFormat, load_user_config};
pub use locale_link::{EffectiveConfig, UserConfig};
