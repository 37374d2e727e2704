//! Runtime configuration for the Tally server binary.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Environment variables with this prefix override file settings
/// (`TALLY_PORT=8080`, `TALLY_STORE_PATH=...`).
pub const ENV_PREFIX: &str = "TALLY";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Server configuration, deserialised from `tally.toml` and the environment.
/// Any missing key falls back to [`ServerConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Insert the default habit catalogue at startup.
  pub seed:       bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       5240,
      store_path: PathBuf::from("tally.db"),
      seed:       false,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists), overlay `TALLY_*` variables, and expand a
  /// leading `~/` in the store path.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let settings = Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(Environment::with_prefix(ENV_PREFIX))
      .build()?;
    Self::from_settings(settings)
  }

  pub fn from_settings(settings: Config) -> Result<Self, ConfigError> {
    let mut cfg: Self = settings.try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
