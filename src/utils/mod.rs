//! Persistent configuration helpers.

pub mod settings;

pub use settings::{
    DEFAULT_SETTINGS_FILE, SettingsError, WorldSettings, load_settings, save_settings,
};
