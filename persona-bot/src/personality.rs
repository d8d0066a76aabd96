//! # Personality catalog
//!
//! Named personality profiles (display name, system prompt, generation parameters), loaded once at
//! startup and shared read-only afterwards.
//!
//! Catalog file format (TOML):
//!
//! ```toml
//! [[personality]]
//! name = "pirate"
//! display_name = "Pirate Captain"
//! system_prompt = "You are a pirate captain. Answer in pirate speak."
//! temperature = 0.9   # optional, falls back to the LLM defaults
//! max_tokens = 600    # optional
//! ```
//!
//! Names are case-normalized (trimmed, lowercased) on load and on lookup.

use llm_client::GenerationParams;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::core::{ConfigError, NotFound};

/// A single personality profile. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Personality {
    /// Normalized lookup key.
    pub name: String,
    pub display_name: String,
    pub system_prompt: String,
    pub params: GenerationParams,
}

/// Built-in presets used when no catalog file is configured: (name, display name, prompt).
const BUILTIN_PERSONALITIES: &[(&str, &str, &str)] = &[
    (
        "default",
        "Default Assistant",
        "You are a helpful assistant that responds to user queries accurately and concisely.",
    ),
    (
        "sarcastic",
        "Sarcastic Assistant",
        "You are a sarcastic assistant who responds with wit and humor, while still being helpful.",
    ),
    (
        "poetic",
        "Poetic Assistant",
        "You are a poetic assistant who responds with lyrical and flowery language.",
    ),
    (
        "coding_tutor",
        "Coding Tutor",
        "You are a coding tutor who helps users learn programming concepts and debug their code.",
    ),
];

/// Lookup key form of a personality name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "personality")]
    personalities: Vec<RawPersonality>,
}

#[derive(Debug, Deserialize)]
struct RawPersonality {
    name: Option<String>,
    display_name: Option<String>,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

fn required(
    value: Option<String>,
    index: usize,
    field: &'static str,
) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingField { index, field })
}

/// Registry of personality profiles keyed by normalized name.
#[derive(Debug, Clone)]
pub struct PersonalityCatalog {
    profiles: BTreeMap<String, Arc<Personality>>,
}

impl PersonalityCatalog {
    /// Builds a catalog; rejects duplicate names (after normalization) and an empty set.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = Personality>,
    ) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for mut profile in profiles {
            profile.name = normalize_name(&profile.name);
            let name = profile.name.clone();
            if map.insert(name.clone(), Arc::new(profile)).is_some() {
                return Err(ConfigError::DuplicatePersonality(name));
            }
        }
        if map.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        Ok(Self { profiles: map })
    }

    /// The four built-in presets, all using `params`.
    pub fn builtin(params: GenerationParams) -> Self {
        let profiles = BUILTIN_PERSONALITIES
            .iter()
            .map(|(name, display, prompt)| {
                let profile = Personality {
                    name: name.to_string(),
                    display_name: display.to_string(),
                    system_prompt: prompt.to_string(),
                    params,
                };
                (profile.name.clone(), Arc::new(profile))
            })
            .collect();
        Self { profiles }
    }

    /// Parses a TOML catalog. Missing `temperature` / `max_tokens` fall back to `defaults`;
    /// a missing `display_name` falls back to the name.
    pub fn from_toml_str(source: &str, defaults: GenerationParams) -> Result<Self, ConfigError> {
        let file: CatalogFile =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut profiles = Vec::with_capacity(file.personalities.len());
        for (index, raw) in file.personalities.into_iter().enumerate() {
            let name = required(raw.name, index, "name")?;
            let system_prompt = required(raw.system_prompt, index, "system_prompt")?;
            let display_name = raw
                .display_name
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| name.clone());
            profiles.push(Personality {
                name,
                display_name,
                system_prompt,
                params: GenerationParams {
                    temperature: raw.temperature.unwrap_or(defaults.temperature),
                    max_tokens: raw.max_tokens.unwrap_or(defaults.max_tokens),
                },
            });
        }
        Self::from_profiles(profiles)
    }

    /// Reads and parses a TOML catalog file.
    pub fn load(path: impl AsRef<Path>, defaults: GenerationParams) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&source, defaults)?;
        info!(
            path = %path.display(),
            personalities = catalog.len(),
            "Personality catalog loaded"
        );
        Ok(catalog)
    }

    /// Case-normalized lookup.
    pub fn get(&self, name: &str) -> Result<Arc<Personality>, NotFound> {
        let key = normalize_name(name);
        self.profiles
            .get(&key)
            .cloned()
            .ok_or(NotFound { name: key })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(&normalize_name(name))
    }

    /// Names in lexicographic order.
    pub fn list(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Profiles in the same order as [`list`](Self::list).
    pub fn profiles(&self) -> impl Iterator<Item = &Personality> {
        self.profiles.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
