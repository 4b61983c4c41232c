use chrono::{DateTime, Utc};
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::api::VideoApi;
use crate::app::{App, Focus, SidebarItem};
use crate::render::{Card, Fragment, Tone, render_pane};
use crate::theme::Theme;
use crate::view_state::{Pane, PaneState};

const SIDEBAR_WIDTH: u16 = 20;
const MENU_GLYPH: &str = " ☰ ";

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded_block<'a>(title: impl Into<Line<'a>>, color: ratatui::style::Color) -> Block<'a> {
  Block::bordered()
    .title(title)
    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(color))
}

// --- UI Rendering ---

pub fn ui<A: VideoApi>(frame: &mut Frame, app: &mut App<A>) {
  let theme = app.theme();
  app.hit.menu = None;
  app.hit.sidebar_rows.clear();
  app.hit.cards.clear();
  app.hit.modal = None;

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, input_area, body_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Min(6),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_input(frame, app, input_area);

  let main_area = if app.sidebar_visible {
    let [sidebar_area, main_area] =
      Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)]).areas(body_area);
    render_sidebar(frame, app, sidebar_area);
    main_area
  } else {
    body_area
  };

  let now = Utc::now();
  let [recs_area, search_area, history_area] =
    Layout::vertical([Constraint::Fill(1), Constraint::Fill(1), Constraint::Length(5)]).areas(main_area);
  render_pane_area(frame, app, Pane::Recommendations, recs_area, now);
  render_pane_area(frame, app, Pane::Search, search_area, now);
  render_pane_area(frame, app, Pane::History, history_area, now);

  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  if app.modal.is_open() {
    render_modal(frame, app);
  }
}

fn render_header<A: VideoApi>(frame: &mut Frame, app: &mut App<A>, area: Rect) {
  let theme = app.theme();
  let menu_width = MENU_GLYPH.chars().count() as u16;
  let left = Line::from(vec![
    Span::styled(MENU_GLYPH, Style::default().fg(theme.fg)),
    Span::styled("▶ vidrec ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
  ]);
  frame.render_widget(left, area);
  app.hit.menu = Some(Rect { width: menu_width.min(area.width), ..area });

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_width = (version.len() as u16).min(area.width);
  let right_area = Rect { x: area.x + area.width - right_width, width: right_width, ..area };
  frame.render_widget(right, right_area);
}

fn render_sidebar<A: VideoApi>(frame: &mut Frame, app: &mut App<A>, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Sidebar;
  let block = rounded_block(" Menu ", if focused { theme.accent } else { theme.border });
  let inner = block.inner(area);
  frame.render_widget(block, area);

  for (i, item) in SidebarItem::ALL.iter().enumerate() {
    let row = Rect { y: inner.y + i as u16, height: 1, ..inner };
    if row.y >= inner.y + inner.height {
      break;
    }
    let active = app.active_sidebar == Some(*item);
    let under_cursor = focused && app.sidebar_cursor == i;
    let style = if active {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else if under_cursor {
      Style::default().fg(theme.accent)
    } else {
      Style::default().fg(theme.fg)
    };
    let marker = if under_cursor { "▶ " } else { "  " };
    let text = format!("{}{} {}", marker, item.icon(), item.label());
    frame.render_widget(Paragraph::new(text).style(style), row);
    app.hit.sidebar_rows.push((row, *item));
  }
}

fn pane_title<A: VideoApi>(app: &App<A>, pane: Pane) -> String {
  match pane {
    Pane::Recommendations => " Recommended for you ".to_string(),
    Pane::Search => format!(" {} ", app.views.search_header()),
    Pane::History => " Watch History ".to_string(),
  }
}

fn render_pane_area<A: VideoApi>(frame: &mut Frame, app: &mut App<A>, pane: Pane, area: Rect, now: DateTime<Utc>) {
  let theme = app.theme();
  let focused = app.focus == Focus::Panes && app.focused_pane == pane;
  let block = rounded_block(pane_title(app, pane), if focused { theme.accent } else { theme.border })
    .padding(Padding::horizontal(1));

  let fragment = render_pane(app.views.state(pane), app.views.render_mode(pane), now);
  match fragment {
    Fragment::CardGrid(cards) => {
      let inner_w = area.width.saturating_sub(6) as usize;
      let inner = block.inner(area);
      let selected = app.selected(pane);
      let items: Vec<ListItem> =
        cards.iter().enumerate().map(|(i, card)| card_item(card, theme, inner_w, Some(i) == selected, i)).collect();
      let heights: Vec<u16> = items.iter().map(|item| item.height() as u16).collect();
      let list = List::new(items)
        .block(block)
        .highlight_symbol("▶ ")
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD));
      frame.render_stateful_widget(list, area, app.list_state(pane));

      let offset = app.list_state(pane).offset();
      let mut y = inner.y;
      for (i, height) in heights.iter().enumerate().skip(offset) {
        if y >= inner.bottom() {
          break;
        }
        let row = Rect { y, height: (*height).min(inner.bottom() - y), ..inner };
        app.hit.cards.push((row, pane, i));
        y += height;
      }
    }
    Fragment::Skeleton(count) => {
      let inner_w = area.width.saturating_sub(6) as usize;
      let items: Vec<ListItem> = (0..count).map(|_| skeleton_item(theme, inner_w)).collect();
      frame.render_widget(List::new(items).block(block), area);
    }
    Fragment::Banner { tone, message } => {
      let color = match tone {
        Tone::Muted => theme.muted,
        Tone::Danger => theme.error,
      };
      let paragraph = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(message, Style::default().fg(color)))])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
      frame.render_widget(paragraph, area);
    }
  }
}

fn card_item<'a>(card: &Card, theme: &Theme, inner_w: usize, selected: bool, index: usize) -> ListItem<'a> {
  let duration = format!(" {} ", card.duration);
  let badge = card.badge.map(|b| format!(" {} ", b));
  let reserved = duration.chars().count() + badge.as_ref().map_or(0, |b| b.chars().count() + 1) + 1;
  let title = truncate_str(&card.title, inner_w.saturating_sub(reserved));

  let mut first = vec![
    Span::styled(title, Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    Span::raw(" "),
    Span::styled(duration, Style::default().fg(theme.key_fg).bg(theme.key_bg)),
  ];
  if let Some(badge) = badge {
    first.push(Span::raw(" "));
    first.push(Span::styled(badge, Style::default().fg(theme.badge_fg).bg(theme.badge_bg)));
  }

  let mut stats = vec![Span::styled(card.stats_line(), Style::default().fg(theme.muted))];
  if let Some(score) = &card.score {
    stats.push(Span::raw("  "));
    stats.push(Span::styled(score.clone(), Style::default().fg(theme.status)));
  }

  let mut lines = vec![
    Line::from(first),
    Line::from(Span::styled(truncate_str(&card.channel, inner_w), Style::default().fg(theme.muted))),
    Line::from(stats),
  ];
  if selected {
    let detail =
      if card.thumbnail_url.is_empty() { card.video_id.clone() } else { format!("{}  {}", card.video_id, card.thumbnail_url) };
    lines.push(Line::from(Span::styled(
      truncate_str(&detail, inner_w),
      Style::default().fg(theme.muted).add_modifier(Modifier::ITALIC),
    )));
  }

  let bg = if index % 2 == 1 { theme.stripe_bg } else { theme.bg };
  ListItem::new(lines).bg(bg)
}

fn skeleton_item<'a>(theme: &Theme, inner_w: usize) -> ListItem<'a> {
  let bar = |width: usize| Span::styled(" ".repeat(width.max(1)), Style::default().bg(theme.skeleton));
  ListItem::new(vec![
    Line::from(bar(inner_w * 3 / 4)),
    Line::from(bar(inner_w / 3)),
    Line::from(bar(inner_w / 2)),
    Line::from(""),
  ])
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(row);
  cell
}

fn render_modal<A: VideoApi>(frame: &mut Frame, app: &mut App<A>) {
  let theme = app.theme();
  let Some(session) = app.modal.session() else { return };

  let area = frame.area();
  let width = (area.width * 3 / 5).max(40).min(area.width);
  let height = 10.min(area.height);
  let modal_area = centered(area, width, height);
  let inner_w = width.saturating_sub(4) as usize;

  let mut lines = vec![
    Line::from(""),
    Line::from(vec![
      Span::styled("▶ ", Style::default().fg(theme.accent)),
      Span::styled(truncate_str(&session.embed_url, inner_w.saturating_sub(2)), Style::default().fg(theme.fg)),
    ]),
    Line::from(Span::styled(
      truncate_str(&session.watch_url, inner_w),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )),
    Line::from(""),
  ];
  if let Some(note) = &app.modal.playback_note {
    lines.push(Line::from(Span::styled(note.clone(), Style::default().fg(theme.status))));
  }
  lines.push(Line::from(Span::styled("Esc close  ·  ^o open in browser", Style::default().fg(theme.muted))));

  let title = format!(" {} ", truncate_str(&session.title, inner_w.saturating_sub(2)));
  let block = rounded_block(title, theme.accent).padding(Padding::horizontal(1)).style(Style::default().bg(theme.bg));

  frame.render_widget(Clear, modal_area);
  frame.render_widget(Paragraph::new(lines).block(block), modal_area);
  app.hit.modal = Some(modal_area);
}

fn render_status<A: VideoApi>(frame: &mut Frame, app: &App<A>, area: Rect) {
  let theme = app.theme();
  let loading: Vec<&str> = [Pane::Recommendations, Pane::Search, Pane::History]
    .into_iter()
    .filter(|p| matches!(app.views.state(*p), PaneState::Loading))
    .map(|p| match p {
      Pane::Recommendations => "recommendations",
      Pane::Search => "videos",
      Pane::History => "history",
    })
    .collect();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if !loading.is_empty() {
    (format!(" ⏳ Loading {}…", loading.join(", ")), Style::default().fg(theme.status))
  } else if let Some(session) = app.modal.session() {
    (format!(" ♪ {}", session.title), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input<A: VideoApi>(frame: &mut Frame, app: &mut App<A>, area: Rect) {
  let theme = app.theme();
  let focused = app.focus == Focus::Search && !app.modal.is_open();
  let border_color = if focused { theme.accent } else { theme.border };
  let input_block = rounded_block(" Search ", border_color).padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if focused {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer<A: VideoApi>(frame: &mut Frame, app: &App<A>, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.modal.is_open() {
    vec![("Esc", "Close"), ("^o", "Browser"), ("^t", "Theme")]
  } else {
    match app.focus {
      Focus::Search => vec![("Enter", "Search"), ("↓", "Videos"), ("^b", "Menu"), ("^t", "Theme"), ("^c", "Quit")],
      Focus::Sidebar => vec![("Enter", "Open"), ("j/k", "Navigate"), ("→", "Videos"), ("/", "Search")],
      Focus::Panes => {
        let mut k = vec![("Enter", "Play"), ("j/k", "Navigate"), ("Tab", "Pane"), ("1-3", "Home/History/Trending")];
        if app.sidebar_visible {
          k.push(("←", "Menu"));
        }
        k.push(("/", "Search"));
        k.push(("Esc", "Quit"));
        k
      }
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_width = (theme_label.len() as u16).min(area.width);
  let right_area = Rect { x: area.x + area.width - right_width, width: right_width, ..area };
  frame.render_widget(right, right_area);
}
