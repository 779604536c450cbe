//! Keystroke commands understood by omxplayer on its standard input.
//!
//! Reference: https://github.com/popcornmix/omxplayer#key-bindings

/// A single control command written to the player's stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
  Stop,
  /// Toggles between playing and paused.
  TogglePause,
  ToggleSubtitles,
  SeekForward,
  SeekBackward,
  /// Large seek forward. Not wired to a `Player` method.
  FastForward,
  /// Large seek backward. Not wired to a `Player` method.
  FastBackward,
  /// Not wired to a `Player` method.
  VolumeUp,
  /// Not wired to a `Player` method.
  VolumeDown,
  NextChapter,
  PrevChapter,
  ShowInfo,
  NextAudioStream,
  NextSubtitleStream,
}

impl Command {
  /// Every command, in key-binding table order.
  pub const ALL: [Command; 14] = [
    Command::Stop,
    Command::TogglePause,
    Command::ToggleSubtitles,
    Command::SeekForward,
    Command::SeekBackward,
    Command::FastForward,
    Command::FastBackward,
    Command::VolumeUp,
    Command::VolumeDown,
    Command::NextChapter,
    Command::PrevChapter,
    Command::ShowInfo,
    Command::NextAudioStream,
    Command::NextSubtitleStream,
  ];

  /// Literal bytes the player reads as this keystroke.
  pub fn as_bytes(self) -> &'static [u8] {
    match self {
      Command::Stop => b"q",
      Command::TogglePause => b"p",
      Command::ToggleSubtitles => b"s",
      // ANSI cursor keys: right, left, up, down
      Command::SeekForward => b"\x1b[C",
      Command::SeekBackward => b"\x1b[D",
      Command::FastForward => b"\x1b[A",
      Command::FastBackward => b"\x1b[B",
      Command::VolumeUp => b"+",
      Command::VolumeDown => b"-",
      Command::NextChapter => b"o",
      Command::PrevChapter => b"i",
      Command::ShowInfo => b"z",
      Command::NextAudioStream => b"k",
      Command::NextSubtitleStream => b"m",
    }
  }
}
