//! Scripted `VideoApi` for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::api::VideoApi;
use crate::error::{ApiError, ApiResult};
use crate::model::{HistoryEntry, VideoRecord};

type Scripted<T> = Result<Vec<T>, String>;

fn replay<T: Clone>(scripted: Option<&Scripted<T>>) -> ApiResult<Vec<T>> {
  match scripted {
    Some(Ok(items)) => Ok(items.clone()),
    Some(Err(message)) => Err(ApiError::Status { status: 500, message: message.clone() }),
    None => Ok(Vec::new()),
  }
}

pub fn video(id: &str) -> VideoRecord {
  VideoRecord {
    video_id: id.to_string(),
    title: format!("Video {}", id),
    channel_title: "Test Channel".to_string(),
    thumbnail_url: String::new(),
    duration: Some("PT3M20S".to_string()),
    view_count: 42,
    published_at: None,
    score: None,
  }
}

/// Responses are fixed up front; unknown queries answer with an empty list.
#[derive(Default)]
pub struct FakeApi {
  searches: HashMap<String, Scripted<VideoRecord>>,
  recommendations: Option<Scripted<VideoRecord>>,
  history: Option<Scripted<HistoryEntry>>,
  gates: Mutex<HashMap<String, Arc<Notify>>>,
  watched: Mutex<Vec<String>>,
}

impl FakeApi {
  pub fn with_search(mut self, query: &str, result: ApiResult<Vec<VideoRecord>>) -> Self {
    self.searches.insert(query.to_string(), result.map_err(|e| e.to_string()));
    self
  }

  pub fn with_recommendations(mut self, result: ApiResult<Vec<VideoRecord>>) -> Self {
    self.recommendations = Some(result.map_err(|e| e.to_string()));
    self
  }

  pub fn with_history(mut self, result: ApiResult<Vec<HistoryEntry>>) -> Self {
    self.history = Some(result.map_err(|e| e.to_string()));
    self
  }

  /// Hold searches for `query` until the returned gate is notified.
  pub fn gate_search(&self, query: &str) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    self.gates.lock().unwrap().insert(query.to_string(), Arc::clone(&gate));
    gate
  }

  pub fn watched(&self) -> Vec<String> {
    self.watched.lock().unwrap().clone()
  }
}

impl VideoApi for FakeApi {
  async fn search(&self, query: &str, _max_results: u32) -> ApiResult<Vec<VideoRecord>> {
    let gate = self.gates.lock().unwrap().get(query).cloned();
    if let Some(gate) = gate {
      gate.notified().await;
    }
    replay(self.searches.get(query))
  }

  async fn recommendations(&self, _user_id: &str, _limit: u32) -> ApiResult<Vec<VideoRecord>> {
    replay(self.recommendations.as_ref())
  }

  async fn history(&self, _user_id: &str, _limit: u32) -> ApiResult<Vec<HistoryEntry>> {
    replay(self.history.as_ref())
  }

  async fn record_watch(&self, _user_id: &str, video_id: &str) -> ApiResult<()> {
    self.watched.lock().unwrap().push(video_id.to_string());
    Ok(())
  }
}
