use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User preferences stored in `prefs.toml` under the platform config dir.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub base_url: Option<String>,
  pub viewer: Option<String>,
  pub log_level: Option<String>,
}

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "vidrec")
}

fn config_file() -> Option<PathBuf> {
  project_dirs().map(|dirs| dirs.config_dir().join("prefs.toml"))
}

impl Config {
  pub fn load() -> Self {
    if let Some(path) = config_file()
      && let Ok(content) = std::fs::read_to_string(path)
    {
      return Self::parse(&content);
    }
    Self::default()
  }

  /// Parse prefs content, falling back to defaults on malformed input.
  pub fn parse(content: &str) -> Self {
    toml::from_str(content).unwrap_or_default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_full_prefs() {
    let config = Config::parse(
      r#"
theme_name = "Paper"
base_url = "http://media.local:8080"
viewer = "browser"
log_level = "debug"
"#,
    );
    assert_eq!(config.theme_name.as_deref(), Some("Paper"));
    assert_eq!(config.base_url.as_deref(), Some("http://media.local:8080"));
    assert_eq!(config.viewer.as_deref(), Some("browser"));
    assert_eq!(config.log_level.as_deref(), Some("debug"));
  }

  #[test]
  fn parse_partial_prefs() {
    let config = Config::parse("theme_name = \"Ember\"\n");
    assert_eq!(config.theme_name.as_deref(), Some("Ember"));
    assert!(config.base_url.is_none());
  }

  #[test]
  fn parse_malformed_falls_back_to_default() {
    assert_eq!(Config::parse("theme_name = ["), Config::default());
  }
}
