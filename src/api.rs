use anyhow::{Context, Result, bail};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::future::Future;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::model::{HistoryEntry, VideoRecord};

/// Read and write operations the client performs against the backend.
pub trait VideoApi: Send + Sync + 'static {
  fn search(&self, query: &str, max_results: u32) -> impl Future<Output = ApiResult<Vec<VideoRecord>>> + Send;

  fn recommendations(&self, user_id: &str, limit: u32) -> impl Future<Output = ApiResult<Vec<VideoRecord>>> + Send;

  fn history(&self, user_id: &str, limit: u32) -> impl Future<Output = ApiResult<Vec<HistoryEntry>>> + Send;

  fn record_watch(&self, user_id: &str, video_id: &str) -> impl Future<Output = ApiResult<()>> + Send;
}

// --- Wire envelopes ---

#[derive(Deserialize)]
struct SearchEnvelope {
  #[serde(default)]
  videos: Option<Vec<VideoRecord>>,
}

#[derive(Deserialize)]
struct RecommendationsEnvelope {
  #[serde(default)]
  recommendations: Option<Vec<VideoRecord>>,
}

#[derive(Deserialize)]
struct HistoryEnvelope {
  #[serde(default)]
  history: Option<Vec<HistoryEntry>>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
  error: String,
}

#[derive(Serialize)]
struct WatchRecord<'a> {
  user_id: &'a str,
  video_id: &'a str,
}

/// HTTP client for the recommendation backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
  http: Client,
  base: Url,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self> {
    let base = Url::parse(base_url).with_context(|| format!("Invalid backend URL: {}", base_url))?;
    if base.cannot_be_a_base() {
      bail!("Backend URL cannot carry API paths: {}", base_url);
    }
    Ok(Self { http: Client::new(), base })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  /// Build an endpoint URL under the base path with URL-encoded query parameters.
  fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().extend(path.split('/'));
    }
    if !params.is_empty() {
      let mut pairs = url.query_pairs_mut();
      for (key, value) in params {
        pairs.append_pair(key, value);
      }
    }
    url
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
    debug!(url = %url, "GET");
    let response = self.http.get(url).send().await?;
    let body = checked_body(response).await?;
    Ok(serde_json::from_slice(&body)?)
  }
}

/// Read the body of a response, turning non-success statuses into `ApiError::Status`.
async fn checked_body(response: Response) -> ApiResult<Vec<u8>> {
  let status = response.status();
  let body = response.bytes().await?;
  if status.is_success() {
    return Ok(body.to_vec());
  }
  Err(ApiError::Status { status: status.as_u16(), message: error_message(&body) })
}

/// Extract the backend's `{"error": "..."}` text, or fall back to the raw body.
fn error_message(body: &[u8]) -> String {
  match serde_json::from_slice::<ErrorEnvelope>(body) {
    Ok(envelope) => envelope.error,
    Err(_) => String::from_utf8_lossy(body).trim().to_string(),
  }
}

impl VideoApi for ApiClient {
  async fn search(&self, query: &str, max_results: u32) -> ApiResult<Vec<VideoRecord>> {
    let max = max_results.to_string();
    let url = self.endpoint("api/search", &[("q", query), ("max_results", &max)]);
    let envelope: SearchEnvelope = self.get_json(url).await?;
    Ok(envelope.videos.unwrap_or_default())
  }

  async fn recommendations(&self, user_id: &str, limit: u32) -> ApiResult<Vec<VideoRecord>> {
    let limit = limit.to_string();
    let url = self.endpoint("api/recommendations", &[("user_id", user_id), ("limit", &limit)]);
    let envelope: RecommendationsEnvelope = self.get_json(url).await?;
    Ok(envelope.recommendations.unwrap_or_default())
  }

  async fn history(&self, user_id: &str, limit: u32) -> ApiResult<Vec<HistoryEntry>> {
    let limit = limit.to_string();
    let url = self.endpoint("api/watch_history", &[("user_id", user_id), ("limit", &limit)]);
    let envelope: HistoryEnvelope = self.get_json(url).await?;
    Ok(envelope.history.unwrap_or_default())
  }

  async fn record_watch(&self, user_id: &str, video_id: &str) -> ApiResult<()> {
    let url = self.endpoint("api/watch_history", &[]);
    debug!(url = %url, video_id, "POST");
    let response = self.http.post(url).json(&WatchRecord { user_id, video_id }).send().await?;
    checked_body(response).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncReadExt, AsyncWriteExt};
  use tokio::net::TcpListener;

  /// Answer exactly one request with a canned response and return the base URL.
  async fn serve_once(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut request = Vec::new();
      let mut buf = [0u8; 1024];
      while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
          Ok(0) | Err(_) => break,
          Ok(n) => request.extend_from_slice(&buf[..n]),
        }
      }
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      let _ = socket.shutdown().await;
    });
    format!("http://{}", addr)
  }

  #[tokio::test]
  async fn non_success_status_carries_backend_error() {
    let base = serve_once("400 Bad Request", r#"{"error": "Query parameter is required"}"#).await;
    let client = ApiClient::new(&base).unwrap();
    match client.search("", 12).await {
      Err(ApiError::Status { status, message }) => {
        assert_eq!(status, 400);
        assert_eq!(message, "Query parameter is required");
      }
      other => panic!("expected a status error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn wrong_body_shape_is_a_format_error() {
    let base = serve_once("200 OK", r#"{"videos": "oops"}"#).await;
    let client = ApiClient::new(&base).unwrap();
    assert!(matches!(client.search("cats", 12).await, Err(ApiError::ResponseFormat(_))));
  }

  #[tokio::test]
  async fn refused_connection_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
    assert!(matches!(client.recommendations("default_user", 12).await, Err(ApiError::Network(_))));
  }

  #[tokio::test]
  async fn recommendations_with_null_titles_still_load() {
    let base = serve_once(
      "200 OK",
      r#"{"recommendations": [{"video_id": "dQw4w9WgXcQ", "title": null, "channel_title": null, "score": 0.9}]}"#,
    )
    .await;
    let client = ApiClient::new(&base).unwrap();
    let recs = client.recommendations("default_user", 12).await.unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].video_id, "dQw4w9WgXcQ");
    assert_eq!(recs[0].title, "");
  }

  #[test]
  fn endpoint_encodes_query_parameters() {
    let client = ApiClient::new("http://127.0.0.1:5000").unwrap();
    let url = client.endpoint("api/search", &[("q", "cats & dogs"), ("max_results", "12")]);
    assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/search?q=cats+%26+dogs&max_results=12");
  }

  #[test]
  fn endpoint_keeps_base_path_prefix() {
    let client = ApiClient::new("http://media.local/app").unwrap();
    let url = client.endpoint("api/watch_history", &[]);
    assert_eq!(url.as_str(), "http://media.local/app/api/watch_history");
  }

  #[test]
  fn endpoint_with_trailing_slash_base() {
    let client = ApiClient::new("http://media.local/app/").unwrap();
    let url = client.endpoint("api/recommendations", &[("user_id", "default_user"), ("limit", "12")]);
    assert_eq!(url.as_str(), "http://media.local/app/api/recommendations?user_id=default_user&limit=12");
  }

  #[test]
  fn invalid_base_url_is_rejected() {
    assert!(ApiClient::new("not a url").is_err());
    assert!(ApiClient::new("mailto:someone@example.com").is_err());
  }

  #[test]
  fn search_envelope_missing_or_null_list_is_empty() {
    let missing: SearchEnvelope = serde_json::from_str("{}").unwrap();
    assert!(missing.videos.unwrap_or_default().is_empty());
    let null: SearchEnvelope = serde_json::from_str(r#"{"videos": null}"#).unwrap();
    assert!(null.videos.unwrap_or_default().is_empty());
  }

  #[test]
  fn history_envelope_counts_opaque_entries() {
    let json = r#"{"history": [
      {"video_id": "a", "watched_at": "2024-03-01T10:00:00", "watch_duration": null, "rating": null},
      {"video_id": "b", "watched_at": "2024-03-02T10:00:00", "watch_duration": 42, "rating": 4.5}
    ]}"#;
    let envelope: HistoryEnvelope = serde_json::from_str(json).unwrap();
    assert_eq!(envelope.history.unwrap_or_default().len(), 2);
  }

  #[test]
  fn error_message_prefers_backend_error_field() {
    assert_eq!(error_message(br#"{"error": "Query parameter is required"}"#), "Query parameter is required");
    assert_eq!(error_message(b"  Bad Gateway \n"), "Bad Gateway");
  }

  #[test]
  fn watch_record_serializes_expected_body() {
    let body = serde_json::to_value(WatchRecord { user_id: "default_user", video_id: "abc" }).unwrap();
    assert_eq!(body, serde_json::json!({"user_id": "default_user", "video_id": "abc"}));
  }
}
