//! Personality settings: default personality and optional catalog file.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PersonalityConfig {
    /// DEFAULT_PERSONALITY
    pub default_personality: String,
    /// PERSONALITIES_FILE; built-in presets when unset.
    pub personalities_file: Option<PathBuf>,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            default_personality: "default".to_string(),
            personalities_file: None,
        }
    }
}

impl PersonalityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_personality: env::var("DEFAULT_PERSONALITY")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_personality),
            personalities_file: env::var("PERSONALITIES_FILE")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}
