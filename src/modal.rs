use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::api::VideoApi;
use crate::constants::constants;
use crate::view_state::ViewStateController;

const DEFAULT_TITLE: &str = "Video Player";

/// Where an opened video actually plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Viewer {
  /// Spawn mpv on the watch URL; falls back to the browser when mpv is missing.
  Mpv,
  /// Open the watch page in the default browser.
  Browser,
  /// Show the modal only.
  Off,
}

impl Viewer {
  pub fn from_config(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "mpv" => Some(Viewer::Mpv),
      "browser" => Some(Viewer::Browser),
      "off" | "none" => Some(Viewer::Off),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
  pub video_id: String,
  pub title: String,
  pub embed_url: String,
  pub watch_url: String,
}

/// The modal overlay and the player behind it. At most one session is open.
pub struct ModalPlayer {
  viewer: Viewer,
  session: Option<PlaybackSession>,
  process: Option<Child>,
  /// Short note on how the current session is playing, shown in the modal.
  pub playback_note: Option<String>,
}

impl ModalPlayer {
  pub fn new(viewer: Viewer) -> Self {
    Self { viewer, session: None, process: None, playback_note: None }
  }

  pub fn session(&self) -> Option<&PlaybackSession> {
    self.session.as_ref()
  }

  pub fn is_open(&self) -> bool {
    self.session.is_some()
  }

  /// Open `video_id`, replacing any current session.
  ///
  /// The watch is recorded and a recommendations refresh is scheduled regardless of
  /// whether the player launches; a launch error is returned after the modal is shown.
  pub fn open<A: VideoApi>(&mut self, video_id: &str, title: &str, views: &ViewStateController<A>) -> Result<()> {
    views.record_watch(video_id);
    self.stop_process();

    let c = constants();
    let title = if title.trim().is_empty() { DEFAULT_TITLE } else { title };
    let session = PlaybackSession {
      video_id: video_id.to_string(),
      title: title.to_string(),
      embed_url: c.embed_url(video_id),
      watch_url: c.watch_url(video_id),
    };
    info!(video_id, viewer = ?self.viewer, "opening video");
    let watch_url = session.watch_url.clone();
    self.session = Some(session);
    self.playback_note = None;

    views.schedule_recommendations_refresh(c.refresh_delay());
    self.launch(&watch_url)
  }

  fn launch(&mut self, watch_url: &str) -> Result<()> {
    match self.viewer {
      Viewer::Off => Ok(()),
      Viewer::Browser => {
        open_in_browser(watch_url)?;
        self.playback_note = Some("Opened in browser".to_string());
        Ok(())
      }
      Viewer::Mpv => match spawn_mpv(watch_url) {
        Ok(child) => {
          self.process = Some(child);
          self.playback_note = Some("Playing in mpv".to_string());
          Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
          warn!("mpv not found, falling back to browser");
          open_in_browser(watch_url)?;
          self.playback_note = Some("mpv not found, opened in browser".to_string());
          Ok(())
        }
        Err(e) => Err(anyhow!(e).context("Failed to spawn mpv process")),
      },
    }
  }

  /// Close the modal and stop the player. Does nothing when no session is open.
  pub fn close(&mut self) {
    if let Some(session) = self.session.take() {
      info!(video_id = %session.video_id, "closing video");
    }
    self.stop_process();
    self.playback_note = None;
  }

  /// Notice a player that exited on its own.
  pub fn check_process(&mut self) {
    if let Some(child) = &mut self.process
      && let Ok(Some(status)) = child.try_wait()
    {
      info!(%status, "player exited");
      self.process = None;
      if self.session.is_some() {
        self.playback_note = Some("Player exited".to_string());
      }
    }
  }

  fn stop_process(&mut self) {
    if let Some(mut child) = self.process.take() {
      // kill_on_drop covers the case where the kill signal cannot be sent now.
      if let Err(e) = child.start_kill() {
        warn!(err = %e, "failed to stop player");
      }
    }
  }
}

fn spawn_mpv(watch_url: &str) -> std::io::Result<Child> {
  Command::new("mpv")
    .args(["--force-window=yes", "--really-quiet", watch_url])
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .kill_on_drop(true)
    .spawn()
}

/// Open `url` in the platform's default browser.
pub fn open_in_browser(url: &str) -> Result<()> {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  let mut child = std::process::Command::new(cmd)
    .arg(url)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to open browser with {}", cmd))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}
