use serde::Deserialize;

/// A single video as returned by the search and recommendation endpoints.
///
/// Search results carry their id as `id`, recommendations as `video_id`; both are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoRecord {
  #[serde(alias = "id")]
  pub video_id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub title: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub channel_title: String,
  #[serde(default, rename = "thumbnail", deserialize_with = "null_as_default")]
  pub thumbnail_url: String,
  /// ISO-8601-like duration token, e.g. `PT5M30S`.
  #[serde(default)]
  pub duration: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub view_count: u64,
  #[serde(default)]
  pub published_at: Option<String>,
  /// Recommendation score; only present on recommendations.
  #[serde(default)]
  pub score: Option<f64>,
}

/// Nullable columns come through as JSON `null`; treat them like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: serde::Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Watch history entry. The client never inspects these, it only counts them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct HistoryEntry(pub serde_json::Value);
