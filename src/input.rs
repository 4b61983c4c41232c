use ratatui::{
  crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind},
  layout::Position,
};

use crate::api::VideoApi;
use crate::app::{App, Focus, SidebarItem};
use crate::modal::open_in_browser;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

/// Route one terminal event to the app.
pub fn handle_event<A: VideoApi>(app: &mut App<A>, event: Event) {
  match event {
    Event::Key(key) if key.kind == KeyEventKind::Press => handle_key_event(app, key),
    Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
      handle_click(app, Position::new(mouse.column, mouse.row));
    }
    Event::Resize(width, _) => app.apply_viewport_width(width),
    _ => {}
  }
}

pub fn handle_key_event<A: VideoApi>(app: &mut App<A>, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => {
        app.should_quit = true;
        return;
      }
      KeyCode::Char('t') => {
        app.next_theme();
        return;
      }
      KeyCode::Char('b') => {
        app.toggle_sidebar();
        return;
      }
      KeyCode::Char('o') => {
        if let Some(url) = app.modal.session().map(|s| s.watch_url.clone())
          && let Err(e) = open_in_browser(&url)
        {
          app.set_error(format!("{:#}", e));
        }
        return;
      }
      _ => {}
    }
  }

  if app.modal.is_open() {
    handle_modal_key(app, key);
    return;
  }

  match app.focus {
    Focus::Search => handle_search_key(app, key),
    Focus::Sidebar => handle_sidebar_key(app, key),
    Focus::Panes => handle_pane_key(app, key),
  }
}

fn handle_modal_key<A: VideoApi>(app: &mut App<A>, key: event::KeyEvent) {
  if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
    app.close_modal();
  }
}

fn handle_search_key<A: VideoApi>(app: &mut App<A>, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter => {
      app.submit_search();
    }
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
      } else {
        app.focus = Focus::Panes;
      }
    }
    KeyCode::Down | KeyCode::Tab => {
      app.focus = Focus::Panes;
    }
    _ => {}
  }
}

fn handle_sidebar_key<A: VideoApi>(app: &mut App<A>, key: event::KeyEvent) {
  let count = SidebarItem::ALL.len();
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => {
      app.sidebar_cursor = (app.sidebar_cursor + 1) % count;
    }
    KeyCode::Up | KeyCode::Char('k') => {
      app.sidebar_cursor = if app.sidebar_cursor == 0 { count - 1 } else { app.sidebar_cursor - 1 };
    }
    KeyCode::Enter => {
      if let Some(&item) = SidebarItem::ALL.get(app.sidebar_cursor) {
        app.select_sidebar(item);
      }
    }
    KeyCode::Right | KeyCode::Tab | KeyCode::Esc => {
      app.focus = Focus::Panes;
    }
    KeyCode::Char('/') | KeyCode::Char('s') => {
      app.focus = Focus::Search;
    }
    _ => {}
  }
}

fn handle_pane_key<A: VideoApi>(app: &mut App<A>, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.move_selection(true),
    KeyCode::Up | KeyCode::Char('k') => app.move_selection(false),
    KeyCode::Enter => app.open_selected(),
    KeyCode::Tab => app.focused_pane = app.focused_pane.next(),
    KeyCode::BackTab => app.focused_pane = app.focused_pane.prev(),
    KeyCode::Char('1') => app.select_sidebar(SidebarItem::Home),
    KeyCode::Char('2') => app.select_sidebar(SidebarItem::History),
    KeyCode::Char('3') => app.select_sidebar(SidebarItem::Trending),
    KeyCode::Char('/') | KeyCode::Char('s') => app.focus = Focus::Search,
    KeyCode::Left | KeyCode::Char('h') => {
      if app.sidebar_visible {
        app.focus = Focus::Sidebar;
      }
    }
    KeyCode::Esc => app.should_quit = true,
    _ => {}
  }
}

fn handle_click<A: VideoApi>(app: &mut App<A>, pos: Position) {
  if app.modal.is_open() {
    // A click on the backdrop dismisses the modal; clicks inside it do nothing.
    if !app.hit.modal.is_some_and(|area| area.contains(pos)) {
      app.close_modal();
    }
    return;
  }

  if app.hit.menu.is_some_and(|area| area.contains(pos)) {
    app.toggle_sidebar();
    return;
  }

  let clicked = app.hit.sidebar_rows.iter().find(|(area, _)| area.contains(pos)).map(|(_, item)| *item);
  if let Some(item) = clicked {
    app.select_sidebar(item);
    return;
  }

  let card = app.hit.cards.iter().find(|(area, _, _)| area.contains(pos)).map(|(_, pane, idx)| (*pane, *idx));
  if let Some((pane, idx)) = card {
    app.open_card(pane, idx);
  }
}
