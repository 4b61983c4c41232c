//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub default_base_url: String,
  pub user_id: String,

  // Request limits
  pub search_max_results: u32,
  pub recommendations_limit: u32,
  pub history_limit: u32,
  pub trending_query: String,

  pub skeleton_count: usize,
  pub refresh_delay_ms: u64,
  pub sidebar_breakpoint: u16,

  // Player URLs
  pub embed_url_template: String,
  pub watch_url_template: String,
}

impl Constants {
  pub fn refresh_delay(&self) -> Duration {
    Duration::from_millis(self.refresh_delay_ms)
  }

  pub fn embed_url(&self, video_id: &str) -> String {
    self.embed_url_template.replace("{id}", video_id)
  }

  pub fn watch_url(&self, video_id: &str) -> String {
    self.watch_url_template.replace("{id}", video_id)
  }
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
