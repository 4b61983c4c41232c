//! Pure mapping from pane state and video records to display fragments.
//!
//! Nothing here touches the terminal; `ui` draws the fragments.

use chrono::{DateTime, Utc};

use crate::constants::constants;
use crate::format::{format_duration, format_relative_date, format_score, format_views};
use crate::model::VideoRecord;
use crate::view_state::PaneState;

pub const RECOMMENDED_BADGE: &str = "Recommended";
const NO_VIDEOS: &str = "No videos found";

/// How a list of records is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
  Search,
  Trending,
  Recommendation,
}

/// One rendered video card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
  pub video_id: String,
  pub title: String,
  pub channel: String,
  pub thumbnail_url: String,
  pub duration: String,
  pub views: String,
  pub published: String,
  pub badge: Option<&'static str>,
  /// `Score: X.XX` / `Score: N/A`, recommendations only.
  pub score: Option<String>,
}

impl Card {
  pub fn stats_line(&self) -> String {
    format!("{} views • {}", self.views, self.published)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Muted,
  Danger,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
  CardGrid(Vec<Card>),
  /// Placeholder cards shown while a pane is loading.
  Skeleton(usize),
  Banner { tone: Tone, message: String },
}

pub fn render_card(record: &VideoRecord, mode: RenderMode, now: DateTime<Utc>) -> Card {
  let is_recommendation = mode == RenderMode::Recommendation;
  Card {
    video_id: record.video_id.clone(),
    title: record.title.clone(),
    channel: record.channel_title.clone(),
    thumbnail_url: record.thumbnail_url.clone(),
    duration: format_duration(record.duration.as_deref()),
    views: format_views(record.view_count),
    published: format_relative_date(record.published_at.as_deref(), now),
    badge: is_recommendation.then_some(RECOMMENDED_BADGE),
    score: is_recommendation.then(|| format!("Score: {}", format_score(record.score))),
  }
}

/// Render a record list as a card grid, one card per record in order.
pub fn render(records: &[VideoRecord], mode: RenderMode, now: DateTime<Utc>) -> Fragment {
  if records.is_empty() {
    return Fragment::Banner { tone: Tone::Muted, message: NO_VIDEOS.to_string() };
  }
  Fragment::CardGrid(records.iter().map(|r| render_card(r, mode, now)).collect())
}

pub fn render_pane(state: &PaneState, mode: RenderMode, now: DateTime<Utc>) -> Fragment {
  match state {
    PaneState::Loading => Fragment::Skeleton(constants().skeleton_count),
    PaneState::Populated(records) => render(records, mode, now),
    PaneState::Empty(message) => Fragment::Banner { tone: Tone::Muted, message: message.clone() },
    PaneState::Error(message) => Fragment::Banner { tone: Tone::Danger, message: message.clone() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
  }

  fn record(id: &str, score: Option<f64>) -> VideoRecord {
    VideoRecord {
      video_id: id.to_string(),
      title: format!("Video {}", id),
      channel_title: "Channel".to_string(),
      thumbnail_url: format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id),
      duration: Some("PT4M5S".to_string()),
      view_count: 1_500,
      published_at: Some("2024-06-12T12:00:00Z".to_string()),
      score,
    }
  }

  #[test]
  fn one_card_per_record_tagged_with_id() {
    let records = vec![record("a", None), record("b", None), record("c", None)];
    let Fragment::CardGrid(cards) = render(&records, RenderMode::Search, now()) else {
      panic!("expected a card grid");
    };
    let ids: Vec<&str> = cards.iter().map(|c| c.video_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
  }

  #[test]
  fn card_fields_are_formatted() {
    let card = render_card(&record("a", None), RenderMode::Search, now());
    assert_eq!(card.duration, "4:05");
    assert_eq!(card.views, "1.5K");
    assert_eq!(card.published, "3 days ago");
    assert_eq!(card.stats_line(), "1.5K views • 3 days ago");
    assert!(card.badge.is_none());
    assert!(card.score.is_none());
  }

  #[test]
  fn recommendation_mode_adds_badge_and_score() {
    let card = render_card(&record("a", Some(0.456)), RenderMode::Recommendation, now());
    assert_eq!(card.badge, Some(RECOMMENDED_BADGE));
    assert_eq!(card.score.as_deref(), Some("Score: 0.46"));

    let unscored = render_card(&record("b", None), RenderMode::Recommendation, now());
    assert_eq!(unscored.score.as_deref(), Some("Score: N/A"));
  }

  #[test]
  fn trending_mode_has_no_badge() {
    let card = render_card(&record("a", Some(0.9)), RenderMode::Trending, now());
    assert!(card.badge.is_none());
    assert!(card.score.is_none());
  }

  #[test]
  fn empty_list_never_renders_a_grid() {
    assert_eq!(
      render(&[], RenderMode::Search, now()),
      Fragment::Banner { tone: Tone::Muted, message: "No videos found".to_string() }
    );
  }

  #[test]
  fn pane_states_map_to_fragments() {
    assert_eq!(render_pane(&PaneState::Loading, RenderMode::Search, now()), Fragment::Skeleton(6));
    assert_eq!(
      render_pane(&PaneState::Empty("nothing".to_string()), RenderMode::Search, now()),
      Fragment::Banner { tone: Tone::Muted, message: "nothing".to_string() }
    );
    assert_eq!(
      render_pane(&PaneState::Error("broken".to_string()), RenderMode::Search, now()),
      Fragment::Banner { tone: Tone::Danger, message: "broken".to_string() }
    );
    assert!(matches!(
      render_pane(&PaneState::Populated(vec![record("a", None)]), RenderMode::Search, now()),
      Fragment::CardGrid(cards) if cards.len() == 1
    ));
  }
}
