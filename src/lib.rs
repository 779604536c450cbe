//! Control an omxplayer subprocess over its stdin keystroke interface.
//!
//! ```no_run
//! # async fn demo() -> Result<(), omxctl::PlayerError> {
//! use omxctl::{AudioOutput, Player, PlayerConfig};
//!
//! let player = Player::new(&PlayerConfig::default());
//! player.set_audio_output(AudioOutput::Analog);
//! player.play("/media/video.mp4").await?;
//! player.pause().await?;
//! player.stop().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod player;

pub use config::{AudioOutput, ConfigError, PlayerConfig};
pub use player::*;
