//! Player configuration with optional JSON persistence.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Config I/O error: {0}")]
  Io(#[from] io::Error),
  #[error("Config JSON error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("Invalid config: {0}")]
  Invalid(String),
  #[error("Unknown audio output: {0}")]
  UnknownAudioOutput(String),
}

/// Route for decoded audio, passed to the player as `-o <sink>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioOutput {
  /// Local 3.5mm jack.
  #[serde(alias = "local")]
  Analog,
  /// HDMI.
  #[default]
  #[serde(alias = "hdmi")]
  Digital,
}

impl AudioOutput {
  /// Value for the player's `-o` flag.
  pub fn player_flag(self) -> &'static str {
    match self {
      AudioOutput::Analog => "local",
      AudioOutput::Digital => "hdmi",
    }
  }
}

impl fmt::Display for AudioOutput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AudioOutput::Analog => f.write_str("analog"),
      AudioOutput::Digital => f.write_str("digital"),
    }
  }
}

impl FromStr for AudioOutput {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "analog" | "local" => Ok(AudioOutput::Analog),
      "digital" | "hdmi" => Ok(AudioOutput::Digital),
      other => Err(ConfigError::UnknownAudioOutput(other.to_string())),
    }
  }
}

/// Legacy numeric codes: 0 = analog, 1 = digital.
impl TryFrom<u8> for AudioOutput {
  type Error = ConfigError;

  fn try_from(code: u8) -> Result<Self, Self::Error> {
    match code {
      0 => Ok(AudioOutput::Analog),
      1 => Ok(AudioOutput::Digital),
      other => Err(ConfigError::UnknownAudioOutput(other.to_string())),
    }
  }
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
  /// Custom player executable path (None = look up on PATH).
  #[serde(default)]
  pub binary_path: Option<String>,

  /// Audio sink used when playback starts.
  #[serde(default)]
  pub audio_output: AudioOutput,

  /// Additional player arguments, inserted before the URI.
  #[serde(default)]
  pub extra_args: Vec<String>,
}

impl Default for PlayerConfig {
  fn default() -> Self {
    Self {
      binary_path: None,
      audio_output: AudioOutput::default(),
      extra_args: Vec::new(),
    }
  }
}

impl PlayerConfig {
  /// Default location: `<config dir>/omxctl/config.json`.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("omxctl").join("config.json"))
  }

  /// Load config from a JSON file. A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
      Ok(contents) => contents,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        log::info!("No config at {}, using defaults", path.display());
        return Ok(Self::default());
      }
      Err(e) => return Err(e.into()),
    };

    let config: Self = serde_json::from_str(&contents)?;
    config.validate()?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
  }

  /// Write config as pretty JSON, creating parent directories.
  pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
    self.validate()?;
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(self)?)?;
    Ok(())
  }

  /// Validate configuration values.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.extra_args.iter().any(|arg| arg.trim().is_empty()) {
      return Err(ConfigError::Invalid(
        "Extra player arguments cannot be empty".to_string(),
      ));
    }
    Ok(())
  }

  /// Explicit binary path, treating a blank string as unset.
  pub fn binary(&self) -> Option<PathBuf> {
    self
      .binary_path
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(PathBuf::from)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_to_hdmi() {
    let config = PlayerConfig::default();
    assert_eq!(config.audio_output, AudioOutput::Digital);
    assert_eq!(config.audio_output.player_flag(), "hdmi");
    assert!(config.binary().is_none());
  }

  #[test]
  fn test_missing_fields_take_defaults() {
    let config: PlayerConfig = serde_json::from_str(r#"{"audioOutput":"analog"}"#).unwrap();
    assert_eq!(config.audio_output, AudioOutput::Analog);
    assert!(config.extra_args.is_empty());
    assert!(config.binary_path.is_none());
  }

  #[test]
  fn test_audio_output_aliases() {
    let config: PlayerConfig = serde_json::from_str(r#"{"audioOutput":"local"}"#).unwrap();
    assert_eq!(config.audio_output, AudioOutput::Analog);
    assert_eq!("HDMI".parse::<AudioOutput>().unwrap(), AudioOutput::Digital);
    assert_eq!("analog".parse::<AudioOutput>().unwrap(), AudioOutput::Analog);
  }

  #[test]
  fn test_unknown_audio_output_rejected() {
    assert!(matches!(
      "spdif".parse::<AudioOutput>(),
      Err(ConfigError::UnknownAudioOutput(_))
    ));
    assert!(matches!(
      AudioOutput::try_from(2),
      Err(ConfigError::UnknownAudioOutput(_))
    ));
    assert_eq!(AudioOutput::try_from(0).unwrap(), AudioOutput::Analog);
    assert_eq!(AudioOutput::try_from(1).unwrap(), AudioOutput::Digital);
    assert!(serde_json::from_str::<PlayerConfig>(r#"{"audioOutput":"both"}"#).is_err());
  }

  #[test]
  fn test_blank_binary_path_is_unset() {
    let config = PlayerConfig {
      binary_path: Some("  ".to_string()),
      ..Default::default()
    };
    assert!(config.binary().is_none());
  }

  #[test]
  fn test_validate_rejects_blank_args() {
    let config = PlayerConfig {
      extra_args: vec!["--loop".to_string(), " ".to_string()],
      ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
  }

  #[test]
  fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = PlayerConfig {
      binary_path: Some("/usr/bin/omxplayer".to_string()),
      audio_output: AudioOutput::Analog,
      extra_args: vec!["--no-osd".to_string()],
    };

    config.save(&path).unwrap();
    assert_eq!(PlayerConfig::load(&path).unwrap(), config);
  }

  #[test]
  fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = PlayerConfig::load(&dir.path().join("absent.json")).unwrap();
    assert_eq!(config, PlayerConfig::default());
  }
}
