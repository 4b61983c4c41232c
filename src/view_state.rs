//! Pane state for recommendations, search results and watch history.
//!
//! Every load marks its pane `Loading`, spawns the API call and tags it with a
//! per-pane sequence number. Completions come back as [`AppEvent`]s and are applied
//! with [`ViewStateController::apply`]; only the latest issued request of a pane
//! may change that pane's state.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::VideoApi;
use crate::constants::constants;
use crate::error::ApiResult;
use crate::model::{HistoryEntry, VideoRecord};
use crate::render::RenderMode;

pub const SEARCH_HEADER: &str = "Search Results";
pub const TRENDING_HEADER: &str = "Trending Videos";
const SEARCH_PROMPT: &str = "Search for videos to get started.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
  Recommendations,
  Search,
  History,
}

impl Pane {
  pub fn next(self) -> Self {
    match self {
      Pane::Recommendations => Pane::Search,
      Pane::Search => Pane::History,
      Pane::History => Pane::Recommendations,
    }
  }

  pub fn prev(self) -> Self {
    self.next().next()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaneState {
  Loading,
  Populated(Vec<VideoRecord>),
  Empty(String),
  Error(String),
}

/// The request that owns a pane's current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneRequest {
  Recommendations,
  Search(String),
  Trending,
  History,
}

impl PaneRequest {
  pub fn pane(&self) -> Pane {
    match self {
      PaneRequest::Recommendations => Pane::Recommendations,
      PaneRequest::Search(_) | PaneRequest::Trending => Pane::Search,
      PaneRequest::History => Pane::History,
    }
  }

  pub fn render_mode(&self) -> RenderMode {
    match self {
      PaneRequest::Recommendations => RenderMode::Recommendation,
      PaneRequest::Trending => RenderMode::Trending,
      PaneRequest::Search(_) | PaneRequest::History => RenderMode::Search,
    }
  }

  fn empty_message(&self) -> &'static str {
    match self {
      PaneRequest::Recommendations => {
        "No recommendations yet. Start watching videos to get personalized suggestions!"
      }
      PaneRequest::Search(_) => "No videos found for your search.",
      PaneRequest::Trending => "No trending videos available.",
      PaneRequest::History => "No watch history yet",
    }
  }

  fn error_message(&self) -> &'static str {
    match self {
      PaneRequest::Recommendations => "Error loading recommendations",
      PaneRequest::Search(_) => "Error loading search results",
      PaneRequest::Trending => "Error loading trending videos",
      PaneRequest::History => "Error loading watch history",
    }
  }
}

/// Successful response body of a pane request.
#[derive(Debug)]
pub enum Payload {
  Videos(Vec<VideoRecord>),
  History(Vec<HistoryEntry>),
}

#[derive(Debug)]
pub struct PaneResponse {
  pub seq: u64,
  pub request: PaneRequest,
  pub outcome: ApiResult<Payload>,
}

/// Completions delivered to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
  Pane(PaneResponse),
  RefreshRecommendations,
}

/// Map a finished request to the state its pane should show.
pub fn resolve(request: &PaneRequest, outcome: ApiResult<Payload>) -> PaneState {
  match outcome {
    Ok(Payload::Videos(videos)) if videos.is_empty() => PaneState::Empty(request.empty_message().to_string()),
    Ok(Payload::Videos(videos)) => PaneState::Populated(videos),
    // Entries are never listed; the pane only says whether any exist.
    Ok(Payload::History(entries)) if entries.is_empty() => PaneState::Empty(request.empty_message().to_string()),
    Ok(Payload::History(_)) => PaneState::Empty("Watch history will appear here after you watch videos".to_string()),
    Err(e) => {
      error!(pane = ?request.pane(), err = %e, "pane request failed");
      PaneState::Error(request.error_message().to_string())
    }
  }
}

#[derive(Debug)]
struct PaneSlot {
  state: PaneState,
  latest: u64,
  request: Option<PaneRequest>,
}

impl PaneSlot {
  fn new(state: PaneState) -> Self {
    Self { state, latest: 0, request: None }
  }
}

pub struct ViewStateController<A: VideoApi> {
  api: Arc<A>,
  events: mpsc::UnboundedSender<AppEvent>,
  recommendations: PaneSlot,
  search: PaneSlot,
  history: PaneSlot,
  search_header: &'static str,
}

impl<A: VideoApi> ViewStateController<A> {
  pub fn new(api: Arc<A>, events: mpsc::UnboundedSender<AppEvent>) -> Self {
    Self {
      api,
      events,
      recommendations: PaneSlot::new(PaneState::Loading),
      search: PaneSlot::new(PaneState::Empty(SEARCH_PROMPT.to_string())),
      history: PaneSlot::new(PaneState::Loading),
      search_header: SEARCH_HEADER,
    }
  }

  fn slot(&self, pane: Pane) -> &PaneSlot {
    match pane {
      Pane::Recommendations => &self.recommendations,
      Pane::Search => &self.search,
      Pane::History => &self.history,
    }
  }

  fn slot_mut(&mut self, pane: Pane) -> &mut PaneSlot {
    match pane {
      Pane::Recommendations => &mut self.recommendations,
      Pane::Search => &mut self.search,
      Pane::History => &mut self.history,
    }
  }

  pub fn state(&self, pane: Pane) -> &PaneState {
    &self.slot(pane).state
  }

  /// Sequence number of the most recently issued request for `pane` (0 before any).
  pub fn latest_seq(&self, pane: Pane) -> u64 {
    self.slot(pane).latest
  }

  pub fn render_mode(&self, pane: Pane) -> RenderMode {
    match &self.slot(pane).request {
      Some(request) => request.render_mode(),
      None if pane == Pane::Recommendations => RenderMode::Recommendation,
      None => RenderMode::Search,
    }
  }

  pub fn search_header(&self) -> &'static str {
    self.search_header
  }

  /// Records shown by a populated pane.
  pub fn records(&self, pane: Pane) -> &[VideoRecord] {
    match self.state(pane) {
      PaneState::Populated(records) => records.as_slice(),
      _ => &[],
    }
  }

  /// Mark the request's pane as loading and return its new sequence number.
  pub(crate) fn begin(&mut self, request: PaneRequest) -> u64 {
    let slot = self.slot_mut(request.pane());
    slot.latest += 1;
    slot.state = PaneState::Loading;
    slot.request = Some(request);
    slot.latest
  }

  /// Apply a completed request. Returns `false` when the response is stale and was discarded.
  pub fn apply(&mut self, response: PaneResponse) -> bool {
    let pane = response.request.pane();
    let slot = self.slot_mut(pane);
    if response.seq != slot.latest {
      debug!(?pane, seq = response.seq, latest = slot.latest, "discarding stale response");
      return false;
    }
    slot.state = resolve(&response.request, response.outcome);
    true
  }

  fn issue(&mut self, request: PaneRequest) {
    let seq = self.begin(request.clone());
    let api = Arc::clone(&self.api);
    let tx = self.events.clone();
    info!(?request, seq, "loading pane");

    tokio::spawn(async move {
      let c = constants();
      let outcome = match &request {
        PaneRequest::Recommendations => {
          api.recommendations(&c.user_id, c.recommendations_limit).await.map(Payload::Videos)
        }
        PaneRequest::Search(query) => api.search(query, c.search_max_results).await.map(Payload::Videos),
        PaneRequest::Trending => api.search(&c.trending_query, c.search_max_results).await.map(Payload::Videos),
        PaneRequest::History => api.history(&c.user_id, c.history_limit).await.map(Payload::History),
      };
      let _ = tx.send(AppEvent::Pane(PaneResponse { seq, request, outcome }));
    });
  }

  pub fn load_recommendations(&mut self) {
    self.issue(PaneRequest::Recommendations);
  }

  /// Search for `query`. Blank queries are ignored.
  pub fn load_search(&mut self, query: &str) {
    let query = query.trim();
    if query.is_empty() {
      return;
    }
    self.search_header = SEARCH_HEADER;
    self.issue(PaneRequest::Search(query.to_string()));
  }

  pub fn load_trending(&mut self) {
    self.search_header = TRENDING_HEADER;
    self.issue(PaneRequest::Trending);
  }

  pub fn load_history(&mut self) {
    self.issue(PaneRequest::History);
  }

  /// Write a watch-history record in the background. Failures are only logged.
  pub fn record_watch(&self, video_id: &str) {
    let api = Arc::clone(&self.api);
    let video_id = video_id.to_string();
    tokio::spawn(async move {
      if let Err(e) = api.record_watch(&constants().user_id, &video_id).await {
        warn!(video_id = %video_id, err = %e, "failed to record watch history");
      }
    });
  }

  /// Ask the UI loop to reload recommendations after `delay`.
  pub fn schedule_recommendations_refresh(&self, delay: Duration) {
    let tx = self.events.clone();
    tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let _ = tx.send(AppEvent::RefreshRecommendations);
    });
  }
}
