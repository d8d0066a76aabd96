//! Memory configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::window::{ContextWindow, WindowUnit};

/// Which backend holds the memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    /// One JSON document per user under `<storage_path>/memory/`.
    Json,
    /// `<storage_path>/memory.db`.
    Sqlite,
    /// Process memory only.
    Memory,
}

impl FromStr for StoreType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" | "file" => Ok(StoreType::Json),
            "sqlite" => Ok(StoreType::Sqlite),
            "memory" | "inmemory" => Ok(StoreType::Memory),
            other => Err(format!("unsupported memory store type: {}", other)),
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreType::Json => "json",
            StoreType::Sqlite => "sqlite",
            StoreType::Memory => "memory",
        };
        f.write_str(s)
    }
}

/// Memory storage and windowing configuration interface.
pub trait MemoryConfig: Send + Sync {
    fn store_type(&self) -> StoreType;
    fn storage_path(&self) -> &str;
    fn context_window(&self) -> ContextWindow;
    fn retention(&self) -> Option<ContextWindow>;

    fn json_dir(&self) -> PathBuf {
        PathBuf::from(self.storage_path()).join("memory")
    }

    fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(self.storage_path()).join("memory.db")
    }
}

/// Memory config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvMemoryConfig {
    pub memory_store_type: StoreType,
    pub memory_storage_path: String,
    pub context_window: ContextWindow,
    /// `None` when `MEMORY_RETENTION_LIMIT=0`.
    pub retention: Option<ContextWindow>,
}

impl MemoryConfig for EnvMemoryConfig {
    fn store_type(&self) -> StoreType {
        self.memory_store_type
    }
    fn storage_path(&self) -> &str {
        &self.memory_storage_path
    }
    fn context_window(&self) -> ContextWindow {
        self.context_window
    }
    fn retention(&self) -> Option<ContextWindow> {
        self.retention
    }
}

impl Default for EnvMemoryConfig {
    fn default() -> Self {
        Self {
            memory_store_type: StoreType::Json,
            memory_storage_path: "./data".to_string(),
            context_window: ContextWindow::turns(10),
            retention: Some(ContextWindow::turns(100)),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} is invalid ({}): {}", name, raw, e)),
        _ => Ok(None),
    }
}

impl EnvMemoryConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let memory_store_type =
            parse_var::<StoreType>("MEMORY_STORE_TYPE")?.unwrap_or(defaults.memory_store_type);
        let memory_storage_path = env::var("MEMORY_STORAGE_PATH")
            .or_else(|_| env::var("STORAGE_PATH"))
            .unwrap_or(defaults.memory_storage_path);

        let window_limit = parse_var::<usize>("CONTEXT_WINDOW_LIMIT")?
            .unwrap_or(defaults.context_window.limit);
        let window_unit = parse_var::<WindowUnit>("CONTEXT_WINDOW_UNIT")?.unwrap_or_default();
        if window_limit == 0 {
            anyhow::bail!("CONTEXT_WINDOW_LIMIT must be at least 1");
        }

        let retention_limit = parse_var::<usize>("MEMORY_RETENTION_LIMIT")?.unwrap_or(100);
        let retention_unit =
            parse_var::<WindowUnit>("MEMORY_RETENTION_UNIT")?.unwrap_or_default();
        let retention =
            (retention_limit > 0).then(|| ContextWindow::new(retention_limit, retention_unit));

        Ok(Self {
            memory_store_type,
            memory_storage_path,
            context_window: ContextWindow::new(window_limit, window_unit),
            retention,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "MEMORY_STORE_TYPE",
            "MEMORY_STORAGE_PATH",
            "STORAGE_PATH",
            "CONTEXT_WINDOW_LIMIT",
            "CONTEXT_WINDOW_UNIT",
            "MEMORY_RETENTION_LIMIT",
            "MEMORY_RETENTION_UNIT",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = EnvMemoryConfig::from_env().unwrap();
        assert_eq!(config.store_type(), StoreType::Json);
        assert_eq!(config.storage_path(), "./data");
        assert_eq!(config.context_window(), ContextWindow::turns(10));
        assert_eq!(config.retention(), Some(ContextWindow::turns(100)));
        assert_eq!(config.json_dir(), PathBuf::from("./data").join("memory"));
    }

    #[test]
    #[serial]
    fn test_custom_values() {
        clear_env();
        env::set_var("MEMORY_STORE_TYPE", "sqlite");
        env::set_var("MEMORY_STORAGE_PATH", "/tmp/bot");
        env::set_var("CONTEXT_WINDOW_LIMIT", "2000");
        env::set_var("CONTEXT_WINDOW_UNIT", "chars");
        env::set_var("MEMORY_RETENTION_LIMIT", "0");
        let config = EnvMemoryConfig::from_env().unwrap();
        assert_eq!(config.store_type(), StoreType::Sqlite);
        assert_eq!(config.sqlite_path(), PathBuf::from("/tmp/bot").join("memory.db"));
        assert_eq!(config.context_window(), ContextWindow::new(2000, WindowUnit::Chars));
        assert!(config.retention().is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_window_is_rejected() {
        clear_env();
        env::set_var("CONTEXT_WINDOW_LIMIT", "0");
        assert!(EnvMemoryConfig::from_env().is_err());
        env::set_var("CONTEXT_WINDOW_LIMIT", "ten");
        assert!(EnvMemoryConfig::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_unknown_store_type_is_rejected() {
        clear_env();
        env::set_var("MEMORY_STORE_TYPE", "lance");
        assert!(EnvMemoryConfig::from_env().is_err());
        clear_env();
    }
}
