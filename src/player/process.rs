//! Player binary detection and process spawning.

use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use futures_util::future::BoxFuture;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;

use crate::config::AudioOutput;

/// Executable looked up on PATH when no explicit path is configured.
pub const DEFAULT_BINARY: &str = "omxplayer";

#[derive(Error, Debug)]
pub enum ProcessError {
  #[error("{0} executable not found")]
  NotFound(String),
  #[error("Failed to spawn player: {0}")]
  SpawnFailed(#[from] io::Error),
  #[error("Player {0} pipe was not captured")]
  MissingPipe(&'static str),
}

/// Write end of the player's stdin.
pub type PlayerStdin = Pin<Box<dyn AsyncWrite + Send>>;
/// Read end of the player's stdout.
pub type PlayerStdout = Pin<Box<dyn AsyncRead + Send>>;
/// Resolves with the exit code once the process has exited.
pub type PlayerExit = BoxFuture<'static, io::Result<Option<i32>>>;

/// A freshly launched player with its pipes.
pub struct SpawnedPlayer {
  pub pid: Option<u32>,
  pub stdin: PlayerStdin,
  pub stdout: PlayerStdout,
  pub exit: PlayerExit,
}

/// Launches the player process. Implemented by [`SystemSpawner`] and by test fakes.
pub trait Spawner: Send + Sync {
  fn spawn(&self, args: &[String]) -> Result<SpawnedPlayer, ProcessError>;
}

/// Build the player argument list: `-o <sink> [extra...] <uri>`.
pub fn player_args(audio_output: AudioOutput, extra_args: &[String], uri: &str) -> Vec<String> {
  let mut args = Vec::with_capacity(extra_args.len() + 3);
  args.push("-o".to_string());
  args.push(audio_output.player_flag().to_string());
  args.extend(extra_args.iter().cloned());
  args.push(uri.to_string());
  args
}

/// Find the player executable.
pub fn find_player(binary: Option<&Path>) -> Result<PathBuf, ProcessError> {
  if let Some(path) = binary {
    return Ok(path.to_path_buf());
  }

  // Check PATH first
  if let Ok(path) = which::which(DEFAULT_BINARY) {
    return Ok(path);
  }

  // Raspberry Pi OS packages install here, which may be missing from PATH under systemd
  let common_paths = ["/usr/bin/omxplayer", "/usr/local/bin/omxplayer"];
  for path in common_paths {
    let p = PathBuf::from(path);
    if p.exists() {
      return Ok(p);
    }
  }

  Err(ProcessError::NotFound(DEFAULT_BINARY.to_string()))
}

/// Spawns the real player executable.
#[derive(Debug, Clone, Default)]
pub struct SystemSpawner {
  binary: Option<PathBuf>,
}

impl SystemSpawner {
  pub fn new(binary: Option<PathBuf>) -> Self {
    Self { binary }
  }
}

impl Spawner for SystemSpawner {
  fn spawn(&self, args: &[String]) -> Result<SpawnedPlayer, ProcessError> {
    let exe = find_player(self.binary.as_deref())?;
    log::info!("Spawning player: {:?} {:?}", exe, args);

    let mut child = Command::new(&exe)
      .args(args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::null())
      .kill_on_drop(true)
      .spawn()?;

    let stdin = child.stdin.take().ok_or(ProcessError::MissingPipe("stdin"))?;
    let stdout = child.stdout.take().ok_or(ProcessError::MissingPipe("stdout"))?;
    let pid = child.id();

    Ok(SpawnedPlayer {
      pid,
      stdin: Box::pin(stdin),
      stdout: Box::pin(stdout),
      exit: Box::pin(async move { child.wait().await.map(|status| status.code()) }),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_digital_args() {
    let args = player_args(AudioOutput::Digital, &[], "video.mp4");
    assert_eq!(args, vec!["-o", "hdmi", "video.mp4"]);
  }

  #[test]
  fn test_analog_args_with_extras() {
    let extra = vec!["--no-osd".to_string(), "--loop".to_string()];
    let args = player_args(AudioOutput::Analog, &extra, "http://example.com/a.mkv");
    assert_eq!(
      args,
      vec!["-o", "local", "--no-osd", "--loop", "http://example.com/a.mkv"]
    );
  }

  #[test]
  fn test_explicit_binary_wins() {
    let path = PathBuf::from("/opt/custom/omxplayer");
    assert_eq!(find_player(Some(&path)).unwrap(), path);
  }

  #[tokio::test]
  async fn test_spawn_missing_binary() {
    let spawner = SystemSpawner::new(Some(PathBuf::from("/nonexistent/omxplayer")));
    let result = spawner.spawn(&["video.mp4".to_string()]);
    assert!(matches!(result, Err(ProcessError::SpawnFailed(_))));
  }
}
