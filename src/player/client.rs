//! High-level player client with command methods.

use std::io;
use std::sync::Arc;

use async_channel::Sender;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use super::command::Command;
use super::output::OutputDrain;
use super::process::{player_args, PlayerExit, PlayerStdin, ProcessError, Spawner, SystemSpawner};
use crate::config::{AudioOutput, PlayerConfig};

#[derive(Error, Debug)]
pub enum PlayerError {
  #[error("Process error: {0}")]
  Process(#[from] ProcessError),
  #[error("Write to player failed: {0}")]
  WriteFailed(#[from] io::Error),
}

/// A running player process and the handles that belong to it.
struct Session {
  pid: Option<u32>,
  stdin: PlayerStdin,
  exit: PlayerExit,
  drain: OutputDrain,
}

impl Session {
  /// Close stdin, reap the process and join the output drain.
  async fn close(self) {
    let Session { pid, stdin, exit, drain } = self;
    drop(stdin);

    match exit.await {
      Ok(code) => log::info!("Player process (pid: {:?}) exited with code {:?}", pid, code),
      Err(e) => log::warn!("Failed to reap player process (pid: {:?}): {}", pid, e),
    }

    drain.shutdown().await;
  }
}

async fn write_command(stdin: &mut PlayerStdin, cmd: Command) -> io::Result<()> {
  stdin.write_all(cmd.as_bytes()).await?;
  stdin.flush().await
}

/// Controls one player subprocess at a time.
///
/// Clones share the same session. Control methods called while nothing is
/// playing succeed without doing anything.
#[derive(Clone)]
pub struct Player {
  spawner: Arc<dyn Spawner>,
  extra_args: Arc<Mutex<Vec<String>>>,
  audio_output: Arc<Mutex<AudioOutput>>,
  output_sink: Arc<Mutex<Option<Sender<String>>>>,
  paused: Arc<Mutex<bool>>,
  session: Arc<tokio::sync::Mutex<Option<Session>>>,
}

impl Default for Player {
  fn default() -> Self {
    Self::new(&PlayerConfig::default())
  }
}

impl Player {
  /// Create a player that launches the configured executable.
  pub fn new(config: &PlayerConfig) -> Self {
    Self::with_spawner(config, SystemSpawner::new(config.binary()))
  }

  /// Create a player with a custom process launcher.
  pub fn with_spawner(config: &PlayerConfig, spawner: impl Spawner + 'static) -> Self {
    Self {
      spawner: Arc::new(spawner),
      extra_args: Arc::new(Mutex::new(config.extra_args.clone())),
      audio_output: Arc::new(Mutex::new(config.audio_output)),
      output_sink: Arc::new(Mutex::new(None)),
      paused: Arc::new(Mutex::new(false)),
      session: Arc::new(tokio::sync::Mutex::new(None)),
    }
  }

  /// Set the audio sink (takes effect on next play).
  pub fn set_audio_output(&self, output: AudioOutput) {
    *self.audio_output.lock() = output;
  }

  pub fn audio_output(&self) -> AudioOutput {
    *self.audio_output.lock()
  }

  /// Update extra player arguments (takes effect on next play).
  pub fn set_extra_args(&self, args: Vec<String>) {
    *self.extra_args.lock() = args;
  }

  /// Forward player output lines to `sink` (takes effect on next play).
  ///
  /// Lines are offered with `try_send`; they are dropped when the channel is
  /// full or closed.
  pub fn set_output_sink(&self, sink: Option<Sender<String>>) {
    *self.output_sink.lock() = sink;
  }

  /// Locally tracked pause state. Not read back from the player.
  pub fn is_paused(&self) -> bool {
    *self.paused.lock()
  }

  /// Whether a player process is currently running.
  pub async fn is_running(&self) -> bool {
    self.session.lock().await.is_some()
  }

  /// Process id of the running player, if any.
  pub async fn pid(&self) -> Option<u32> {
    self.session.lock().await.as_ref().and_then(|s| s.pid)
  }

  /// Start playing `uri`, stopping the current player first if one is running.
  pub async fn play(&self, uri: &str) -> Result<(), PlayerError> {
    let mut session = self.session.lock().await;
    if session.is_some() {
      log::info!("Player already running, stopping it before playing {}", uri);
      let _ = Self::terminate(&mut session).await;
    }

    let args = player_args(self.audio_output(), &self.extra_args.lock(), uri);
    let spawned = self.spawner.spawn(&args)?;
    let drain = OutputDrain::spawn(spawned.stdout, self.output_sink.lock().clone());

    log::info!("Player started (pid: {:?}): {}", spawned.pid, uri);
    *session = Some(Session {
      pid: spawned.pid,
      stdin: spawned.stdin,
      exit: spawned.exit,
      drain,
    });
    Ok(())
  }

  /// Stop the player and wait for it to exit.
  pub async fn stop(&self) -> Result<(), PlayerError> {
    let mut session = self.session.lock().await;
    Self::terminate(&mut session).await
  }

  /// Send the quit key, then wait for the process to exit with no timeout.
  ///
  /// The session is cleared whether or not the quit key could be written; the
  /// write error is returned afterwards.
  async fn terminate(slot: &mut Option<Session>) -> Result<(), PlayerError> {
    let Some(mut session) = slot.take() else {
      return Ok(());
    };

    log::info!("Stopping player (pid: {:?})", session.pid);
    let result = write_command(&mut session.stdin, Command::Stop).await;
    if let Err(e) = &result {
      log::warn!("Failed to send quit to player: {}", e);
    }

    session.close().await;
    log::info!("Player stopped");
    result.map_err(PlayerError::from)
  }

  /// Write a command to the player.
  ///
  /// Does nothing if the player is not running. A failed write means the
  /// player is gone: the session is torn down and the write error returned.
  pub async fn send(&self, cmd: Command) -> Result<(), PlayerError> {
    let mut slot = self.session.lock().await;
    let Some(session) = slot.as_mut() else {
      return Ok(());
    };

    log::debug!("Sending player command {:?}", cmd);
    if let Err(e) = write_command(&mut session.stdin, cmd).await {
      log::error!("Player write failed for {:?}: {}", cmd, e);
      if let Some(session) = slot.take() {
        session.close().await;
      }
      return Err(e.into());
    }
    Ok(())
  }

  /// Pause playback.
  ///
  /// The pause flag is set even if the write fails. Pause and resume send the
  /// same toggle key, so the flag can drift from the player's real state.
  pub async fn pause(&self) -> Result<(), PlayerError> {
    *self.paused.lock() = true;
    self.send(Command::TogglePause).await
  }

  /// Resume playback. See [`Player::pause`].
  pub async fn resume(&self) -> Result<(), PlayerError> {
    *self.paused.lock() = false;
    self.send(Command::TogglePause).await
  }

  /// Seek forward a small step.
  pub async fn seek_forward(&self) -> Result<(), PlayerError> {
    self.send(Command::SeekForward).await
  }

  /// Seek backward a small step.
  pub async fn seek_backward(&self) -> Result<(), PlayerError> {
    self.send(Command::SeekBackward).await
  }

  pub async fn next_chapter(&self) -> Result<(), PlayerError> {
    self.send(Command::NextChapter).await
  }

  pub async fn prev_chapter(&self) -> Result<(), PlayerError> {
    self.send(Command::PrevChapter).await
  }

  pub async fn next_audio_stream(&self) -> Result<(), PlayerError> {
    self.send(Command::NextAudioStream).await
  }

  pub async fn next_subtitle_stream(&self) -> Result<(), PlayerError> {
    self.send(Command::NextSubtitleStream).await
  }

  /// Toggle subtitle display.
  pub async fn toggle_subtitles(&self) -> Result<(), PlayerError> {
    self.send(Command::ToggleSubtitles).await
  }

  /// Show stream info on screen.
  pub async fn show_info(&self) -> Result<(), PlayerError> {
    self.send(Command::ShowInfo).await
  }
}
