use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::RwLock;
use log::{error, info, warn};
use notify::{RecommendedWatcher, RecursiveMode, Watcher, Config as NotifyConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings applied to every generated map record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapDefaults {
    pub name: String,
    pub description: String,
    /// Largest `width * height` a generate request may ask for.
    pub max_cells: usize,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            name: "Generated Map".to_string(),
            description: "A procedurally generated map".to_string(),
            max_cells: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub placeholder_width: u32,
    pub placeholder_height: u32,
    pub cell_pixels: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            placeholder_width: 10,
            placeholder_height: 10,
            cell_pixels: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    pub log_level: String,
    /// Postgres URL. Without one the server keeps everything in memory.
    pub database_url: Option<String>,
    pub apply_schema: bool,
    pub map_defaults: MapDefaults,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            log_level: "info".to_string(),
            database_url: None,
            apply_schema: false,
            map_defaults: MapDefaults::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Reads `path` if one is given. A file that cannot be loaded yields the
    /// defaults together with the reason, so the caller can report it once
    /// logging is up.
    pub fn load_or_default(path: Option<&Path>) -> (Self, Option<ConfigError>) {
        match path.map(Config::load) {
            Some(Ok(config)) => (config, None),
            Some(Err(e)) => (Config::default(), Some(e)),
            None => (Config::default(), None),
        }
    }
}

pub type SharedConfig = Arc<RwLock<Config>>;

/// Shares an already loaded config and, when a path is given, watches it so
/// map defaults and render settings pick up edits without a restart. Must be
/// called inside a tokio runtime.
pub fn create_shared_config(config: Config, path: Option<&Path>) -> SharedConfig {
    let shared_config = Arc::new(RwLock::new(config));

    if let Some(path) = path {
        let path = path.canonicalize().unwrap_or_else(|e| {
            warn!("Failed to canonicalize config path: {}, using as-is", e);
            path.to_path_buf()
        });
        let config_clone = shared_config.clone();
        tokio::spawn(watch_config(path, config_clone));
    }

    shared_config
}

async fn watch_config(path: PathBuf, config: SharedConfig) {
    let (tx, mut rx) = tokio::sync::mpsc::channel(1);

    let mut watcher = match RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| {
            let _ = tx.blocking_send(res);
        },
        NotifyConfig::default(),
    ) {
        Ok(watcher) => watcher,
        Err(e) => {
            error!("Failed to create config watcher: {}", e);
            return;
        }
    };

    // Watch the directory containing the config file
    let watch_path = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Err(e) = watcher.watch(watch_path, RecursiveMode::NonRecursive) {
        error!("Failed to watch {}: {}", watch_path.display(), e);
        return;
    }

    while let Some(res) = rx.recv().await {
        match res {
            Ok(event) => {
                let touches_config = event.paths.iter()
                    .any(|p| p.canonicalize().map(|p| p == path).unwrap_or(false));
                if !touches_config {
                    continue;
                }
                match Config::load(&path) {
                    Ok(new_config) => {
                        info!("Reloaded config from {}", path.display());
                        *config.write() = new_config;
                    }
                    Err(e) => warn!("Failed to reload config: {}", e),
                }
            }
            Err(e) => warn!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let config: Config = toml::from_str(r#"
            bind_address = "0.0.0.0:9000"

            [map_defaults]
            name = "Dungeon"
        "#).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.map_defaults.name, "Dungeon");
        assert_eq!(config.map_defaults.description, MapDefaults::default().description);
        assert_eq!(config.render, RenderConfig::default());
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/definitely/not/here/maze.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn load_or_default_reports_unreadable_files() {
        let (config, err) = Config::load_or_default(Some(Path::new("/definitely/not/here/maze.toml")));
        assert_eq!(config, Config::default());
        assert!(matches!(err, Some(ConfigError::Io(_))));

        let (config, err) = Config::load_or_default(None);
        assert_eq!(config, Config::default());
        assert!(err.is_none());
    }

    #[test]
    fn load_or_default_reads_the_file_once() {
        let path = std::env::temp_dir().join(format!("maze-config-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "log_level = \"debug\"\n[map_defaults]\nmax_cells = 64\n").unwrap();
        let (config, err) = Config::load_or_default(Some(&path));
        fs::remove_file(&path).unwrap();

        assert!(err.is_none());
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.map_defaults.max_cells, 64);
    }

    #[tokio::test]
    async fn shared_config_keeps_the_loaded_values() {
        let mut loaded = Config::default();
        loaded.map_defaults.name = "Crypt".to_string();
        let config = create_shared_config(loaded.clone(), None);
        assert_eq!(*config.read(), loaded);
    }
}
