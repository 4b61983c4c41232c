use ratatui::{layout::Rect, widgets::ListState};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

use crate::api::{ApiClient, VideoApi};
use crate::config::Config;
use crate::constants::constants;
use crate::modal::ModalPlayer;
use crate::theme::THEMES;
use crate::view_state::{AppEvent, Pane, PaneState, ViewStateController};

/// Which part of the screen receives key input while the modal is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  Search,
  Sidebar,
  Panes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarItem {
  Home,
  History,
  Trending,
}

impl SidebarItem {
  pub const ALL: [SidebarItem; 3] = [SidebarItem::Home, SidebarItem::History, SidebarItem::Trending];

  pub fn label(self) -> &'static str {
    match self {
      SidebarItem::Home => "Home",
      SidebarItem::History => "History",
      SidebarItem::Trending => "Trending",
    }
  }

  pub fn icon(self) -> &'static str {
    match self {
      SidebarItem::Home => "⌂",
      SidebarItem::History => "↺",
      SidebarItem::Trending => "🔥",
    }
  }
}

/// Screen regions from the last draw, used for mouse hit-testing.
#[derive(Debug, Default)]
pub struct HitAreas {
  pub menu: Option<Rect>,
  pub sidebar_rows: Vec<(Rect, SidebarItem)>,
  /// Visible cards as (area, pane, index into the pane's records).
  pub cards: Vec<(Rect, Pane, usize)>,
  pub modal: Option<Rect>,
}

/// Whether the sidebar shows at the given terminal width.
pub fn sidebar_visible_for_width(width: u16) -> bool {
  width > constants().sidebar_breakpoint
}

fn pane_slot(pane: Pane) -> usize {
  match pane {
    Pane::Recommendations => 0,
    Pane::Search => 1,
    Pane::History => 2,
  }
}

pub struct App<A: VideoApi = ApiClient> {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub focus: Focus,
  pub theme_index: usize,
  pub views: ViewStateController<A>,
  pub modal: ModalPlayer,
  pub sidebar_visible: bool,
  /// Highlighted sidebar row (keyboard cursor).
  pub sidebar_cursor: usize,
  /// The sidebar entry marked active; none until the user picks one.
  pub active_sidebar: Option<SidebarItem>,
  pub focused_pane: Pane,
  pane_lists: [ListState; 3],
  pub last_error: Option<String>,
  pub should_quit: bool,
  pub hit: HitAreas,
  config: Config,
  events: mpsc::UnboundedReceiver<AppEvent>,
  error_time: Option<Instant>,
}

impl<A: VideoApi> App<A> {
  pub fn new(api: Arc<A>, modal: ModalPlayer, config: Config) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let theme_index = crate::theme::theme_index(config.theme_name.as_deref());
    Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      focus: Focus::Search,
      theme_index,
      views: ViewStateController::new(api, tx),
      modal,
      sidebar_visible: false,
      sidebar_cursor: 0,
      active_sidebar: None,
      focused_pane: Pane::Recommendations,
      pane_lists: Default::default(),
      last_error: None,
      should_quit: false,
      hit: HitAreas::default(),
      config,
      events: rx,
      error_time: None,
    }
  }

  /// Apply the initial viewport width and load the panes shown at startup.
  pub fn start(&mut self, width: u16) {
    self.apply_viewport_width(width);
    self.views.load_recommendations();
    self.views.load_history();
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is bounded by theme_index() and the modular arithmetic in next_theme().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after 5 seconds.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.clear_error();
    }
  }

  // --- Sidebar ---

  pub fn toggle_sidebar(&mut self) {
    self.sidebar_visible = !self.sidebar_visible;
    if !self.sidebar_visible && self.focus == Focus::Sidebar {
      self.focus = Focus::Panes;
    }
  }

  /// Recompute sidebar visibility from the terminal width, overriding any manual toggle.
  pub fn apply_viewport_width(&mut self, width: u16) {
    self.sidebar_visible = sidebar_visible_for_width(width);
    if !self.sidebar_visible && self.focus == Focus::Sidebar {
      self.focus = Focus::Panes;
    }
  }

  /// Mark `item` as the single active sidebar entry and load what it shows.
  pub fn select_sidebar(&mut self, item: SidebarItem) {
    info!(item = item.label(), "sidebar selection");
    self.active_sidebar = Some(item);
    if let Some(idx) = SidebarItem::ALL.iter().position(|i| *i == item) {
      self.sidebar_cursor = idx;
    }
    match item {
      SidebarItem::Home => {
        self.views.load_recommendations();
        self.focused_pane = Pane::Recommendations;
      }
      SidebarItem::History => {
        self.views.load_history();
        self.focused_pane = Pane::History;
      }
      SidebarItem::Trending => {
        self.views.load_trending();
        self.focused_pane = Pane::Search;
      }
    }
  }

  // --- Search ---

  /// Submit the search box. Blank queries are ignored.
  pub fn submit_search(&mut self) {
    let query = self.input.trim().to_string();
    if query.is_empty() {
      return;
    }
    info!(query = %query, "search submitted");
    self.clear_error();
    self.views.load_search(&query);
    self.focused_pane = Pane::Search;
    self.focus = Focus::Panes;
  }

  // --- Panes ---

  pub fn list_state(&mut self, pane: Pane) -> &mut ListState {
    &mut self.pane_lists[pane_slot(pane)]
  }

  pub fn selected(&self, pane: Pane) -> Option<usize> {
    self.pane_lists[pane_slot(pane)].selected()
  }

  pub fn move_selection(&mut self, forward: bool) {
    let pane = self.focused_pane;
    let count = self.views.records(pane).len();
    if count == 0 {
      return;
    }
    let state = self.list_state(pane);
    let i = match state.selected() {
      None => 0,
      Some(i) if forward => (i + 1) % count,
      Some(0) => count - 1,
      Some(i) => i - 1,
    };
    state.select(Some(i));
  }

  /// Open the selected card of the focused pane in the modal.
  pub fn open_selected(&mut self) {
    let pane = self.focused_pane;
    let Some(idx) = self.selected(pane) else { return };
    let Some(record) = self.views.records(pane).get(idx) else { return };
    let (video_id, title) = (record.video_id.clone(), record.title.clone());
    self.open_video(&video_id, &title);
  }

  /// Select card `index` of `pane` and open it, as a click on the card does.
  pub fn open_card(&mut self, pane: Pane, index: usize) {
    if index >= self.views.records(pane).len() {
      return;
    }
    self.focus = Focus::Panes;
    self.focused_pane = pane;
    self.list_state(pane).select(Some(index));
    self.open_selected();
  }

  pub fn open_video(&mut self, video_id: &str, title: &str) {
    if let Err(e) = self.modal.open(video_id, title, &self.views) {
      self.set_error(format!("Player error: {:#}", e));
    }
  }

  pub fn close_modal(&mut self) {
    self.modal.close();
  }

  // --- Event draining ---

  /// Apply completed requests and timers. Called once per frame.
  pub fn check_pending(&mut self) {
    while let Ok(event) = self.events.try_recv() {
      self.handle_event(event);
    }
    self.modal.check_process();
    self.expire_error();
  }

  pub fn handle_event(&mut self, event: AppEvent) {
    match event {
      AppEvent::Pane(response) => {
        let pane = response.request.pane();
        if self.views.apply(response) {
          let populated = matches!(self.views.state(pane), PaneState::Populated(_));
          self.list_state(pane).select(populated.then_some(0));
        }
      }
      AppEvent::RefreshRecommendations => {
        info!("refreshing recommendations after watch");
        self.views.load_recommendations();
      }
    }
  }

  /// Wait for the next completion and apply it.
  #[cfg(test)]
  pub async fn next_event(&mut self) {
    if let Some(event) = self.events.recv().await {
      self.handle_event(event);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::modal::Viewer;
  use crate::testing::{FakeApi, video};
  use crate::view_state::{SEARCH_HEADER, TRENDING_HEADER};

  fn app(api: FakeApi) -> App<FakeApi> {
    App::new(Arc::new(api), ModalPlayer::new(Viewer::Off), Config::default())
  }

  #[test]
  fn breakpoint_is_strict() {
    let bp = constants().sidebar_breakpoint;
    assert!(!sidebar_visible_for_width(bp));
    assert!(sidebar_visible_for_width(bp + 1));
    assert!(!sidebar_visible_for_width(40));
  }

  #[tokio::test]
  async fn resize_overrides_manual_toggle() {
    let mut app = app(FakeApi::default());
    let bp = constants().sidebar_breakpoint;
    app.apply_viewport_width(bp + 10);
    app.toggle_sidebar();
    assert!(!app.sidebar_visible);
    app.apply_viewport_width(bp + 20);
    assert!(app.sidebar_visible);
    app.apply_viewport_width(bp - 20);
    assert!(!app.sidebar_visible);
  }

  #[tokio::test]
  async fn start_loads_recommendations_and_history() {
    let api = FakeApi::default().with_recommendations(Ok(vec![video("r-1"), video("r-2")]));
    let mut app = app(api);
    app.start(80);
    app.next_event().await;
    app.next_event().await;

    assert_eq!(app.views.records(Pane::Recommendations).len(), 2);
    assert_eq!(app.selected(Pane::Recommendations), Some(0));
    assert_eq!(app.views.state(Pane::History), &PaneState::Empty("No watch history yet".into()));
  }

  #[tokio::test]
  async fn sidebar_selection_is_exclusive_and_dispatches() {
    let mut app = app(FakeApi::default());
    app.select_sidebar(SidebarItem::Home);
    app.select_sidebar(SidebarItem::Trending);
    assert_eq!(app.active_sidebar, Some(SidebarItem::Trending));
    assert_eq!(app.sidebar_cursor, 2);
    assert_eq!(app.views.search_header(), TRENDING_HEADER);
    assert_eq!(app.views.state(Pane::Search), &PaneState::Loading);
    assert_eq!(app.focused_pane, Pane::Search);

    app.select_sidebar(SidebarItem::History);
    assert_eq!(app.active_sidebar, Some(SidebarItem::History));
    assert_eq!(app.views.latest_seq(Pane::History), 1);
  }

  #[tokio::test]
  async fn blank_search_is_ignored() {
    let mut app = app(FakeApi::default());
    app.input = "   ".to_string();
    app.submit_search();
    assert_eq!(app.views.latest_seq(Pane::Search), 0);
    assert_eq!(app.focus, Focus::Search);
  }

  #[tokio::test]
  async fn search_populates_and_selects_first_card() {
    let api = FakeApi::default().with_search("cats", Ok(vec![video("c-1"), video("c-2")]));
    let mut app = app(api);
    app.input = "cats".to_string();
    app.submit_search();
    assert_eq!(app.views.search_header(), SEARCH_HEADER);
    app.next_event().await;

    assert_eq!(app.focus, Focus::Panes);
    assert_eq!(app.focused_pane, Pane::Search);
    assert_eq!(app.selected(Pane::Search), Some(0));
    app.move_selection(true);
    assert_eq!(app.selected(Pane::Search), Some(1));
    app.move_selection(true);
    assert_eq!(app.selected(Pane::Search), Some(0));
    app.move_selection(false);
    assert_eq!(app.selected(Pane::Search), Some(1));
  }

  #[tokio::test]
  async fn open_selected_uses_the_cards_own_title() {
    let api = FakeApi::default().with_search("cats", Ok(vec![video("c-1"), video("c-2")]));
    let mut app = app(api);
    app.input = "cats".to_string();
    app.submit_search();
    app.next_event().await;
    app.move_selection(true);
    app.open_selected();

    let session = app.modal.session().unwrap();
    assert_eq!(session.video_id, "c-2");
    assert_eq!(session.title, "Video c-2");
  }

  #[tokio::test]
  async fn open_card_focuses_selects_and_opens() {
    let api = FakeApi::default().with_recommendations(Ok(vec![video("r-1"), video("r-2")]));
    let mut app = app(api);
    app.views.load_recommendations();
    app.next_event().await;

    app.open_card(Pane::Recommendations, 5);
    assert!(!app.modal.is_open());

    app.open_card(Pane::Recommendations, 1);
    assert_eq!(app.focus, Focus::Panes);
    assert_eq!(app.focused_pane, Pane::Recommendations);
    assert_eq!(app.selected(Pane::Recommendations), Some(1));
    assert_eq!(app.modal.session().unwrap().video_id, "r-2");
  }

  #[tokio::test(start_paused = true)]
  async fn refresh_event_reloads_recommendations() {
    let mut app = app(FakeApi::default());
    app.open_video("abc", "A");
    assert_eq!(app.views.latest_seq(Pane::Recommendations), 0);
    app.next_event().await;
    assert_eq!(app.views.latest_seq(Pane::Recommendations), 1);
  }
}
