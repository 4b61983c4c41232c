mod api;
mod app;
mod config;
mod constants;
mod error;
mod format;
mod input;
mod logging;
mod modal;
mod model;
mod render;
#[cfg(test)]
mod testing;
mod theme;
mod ui;
mod view_state;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
  DefaultTerminal,
  crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
  },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use api::ApiClient;
use app::App;
use config::Config;
use constants::constants;
use modal::{ModalPlayer, Viewer};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Recommendation backend, e.g. http://127.0.0.1:5000
  #[arg(short, long)]
  base_url: Option<String>,

  /// How opened videos play (default: mpv, falling back to the browser)
  #[arg(short, long)]
  viewer: Option<Viewer>,

  /// Write logs here instead of the platform data dir
  #[arg(long)]
  log_file: Option<PathBuf>,
}

fn resolve_base_url(args: &Args, config: &Config) -> String {
  args
    .base_url
    .clone()
    .or_else(|| config.base_url.clone())
    .unwrap_or_else(|| constants().default_base_url.clone())
}

fn resolve_viewer(args: &Args, config: &Config) -> Viewer {
  args.viewer.or_else(|| config.viewer.as_deref().and_then(Viewer::from_config)).unwrap_or(Viewer::Mpv)
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let config = Config::load();

  // Keep the guard alive for the whole run so buffered log lines get flushed.
  let _log_guard = match args.log_file.clone().or_else(logging::default_log_path) {
    Some(path) => match logging::init(&path, config.log_level.as_deref()) {
      Ok(guard) => Some(guard),
      Err(e) => {
        eprintln!("logging disabled: {:#}", e);
        None
      }
    },
    None => None,
  };

  let base_url = resolve_base_url(&args, &config);
  let viewer = resolve_viewer(&args, &config);
  let api = ApiClient::new(&base_url).with_context(|| format!("Invalid backend URL: {}", base_url))?;
  info!(base_url = %api.base_url(), ?viewer, "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  execute!(std::io::stdout(), EnableMouseCapture).context("Failed to enable mouse capture")?;
  let app = App::new(Arc::new(api), ModalPlayer::new(viewer), config);
  let result = run(&mut terminal, app).await;
  if let Err(e) = execute!(std::io::stdout(), DisableMouseCapture) {
    warn!(err = %e, "failed to disable mouse capture");
  }
  ratatui::restore();
  result
}

async fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
  app.start(terminal.size()?.width);

  loop {
    app.check_pending();
    terminal.draw(|frame| ui::ui(frame, &mut app))?;

    if event::poll(Duration::from_millis(100))? {
      input::handle_event(&mut app, event::read()?);
    }

    if app.should_quit {
      app.close_modal();
      info!("quitting");
      return Ok(());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(argv: &[&str]) -> Args {
    Args::parse_from(std::iter::once("vidrec").chain(argv.iter().copied()))
  }

  #[test]
  fn cli_beats_prefs_beats_constants() {
    let prefs = Config { base_url: Some("http://prefs:1".into()), viewer: Some("browser".into()), ..Config::default() };

    let cli = args(&["--base-url", "http://cli:2", "--viewer", "off"]);
    assert_eq!(resolve_base_url(&cli, &prefs), "http://cli:2");
    assert_eq!(resolve_viewer(&cli, &prefs), Viewer::Off);

    let bare = args(&[]);
    assert_eq!(resolve_base_url(&bare, &prefs), "http://prefs:1");
    assert_eq!(resolve_viewer(&bare, &prefs), Viewer::Browser);

    assert_eq!(resolve_base_url(&bare, &Config::default()), constants().default_base_url);
    assert_eq!(resolve_viewer(&bare, &Config::default()), Viewer::Mpv);
  }

  #[test]
  fn unknown_viewer_in_prefs_falls_back_to_mpv() {
    let prefs = Config { viewer: Some("vlc".into()), ..Config::default() };
    assert_eq!(resolve_viewer(&args(&[]), &prefs), Viewer::Mpv);
  }
}
