//! Runtime configuration, layered from `config.toml` and `HABITLY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  /// Linked from the welcome email.
  pub dashboard_url: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".to_string(),
      port:          3000,
      store_path:    PathBuf::from("habitly.db"),
      dashboard_url: "http://localhost:3000/dashboard".to_string(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and overlay `HABITLY_*` variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::load_with_env(path, config::Environment::with_prefix("HABITLY"))
  }

  fn load_with_env(path: &Path, env: config::Environment) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_uses_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/habitly.toml")).unwrap();
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.address(), "127.0.0.1:3000");
    assert_eq!(cfg.store_path, PathBuf::from("habitly.db"));
  }

  #[test]
  fn file_values_override_defaults() {
    let path = std::env::temp_dir().join(format!("habitly-config-{}.toml", std::process::id()));
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "port = 8080\ndashboard_url = \"https://habitly.example/dashboard\"").unwrap();
    drop(f);

    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.dashboard_url, "https://habitly.example/dashboard");
  }

  #[test]
  fn environment_overrides_file_and_defaults() {
    let path = std::env::temp_dir().join(format!("habitly-env-{}.toml", std::process::id()));
    std::fs::write(&path, "port = 8080\nhost = \"0.0.0.0\"\n").unwrap();

    let vars: config::Map<String, String> = [
      ("HABITLY_PORT".to_string(), "9090".to_string()),
      ("HABITLY_DASHBOARD_URL".to_string(), "https://env.example/dashboard".to_string()),
    ]
    .into_iter()
    .collect();
    let env = config::Environment::with_prefix("HABITLY").source(Some(vars));

    let cfg = ServerConfig::load_with_env(&path, env).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 9090);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.dashboard_url, "https://env.example/dashboard");
    assert_eq!(cfg.store_path, PathBuf::from("habitly.db"));
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x/habitly.db")), PathBuf::from(home).join("x/habitly.db"));
    assert_eq!(expand_tilde(Path::new("/abs/habitly.db")), PathBuf::from("/abs/habitly.db"));
  }
}
