//! omxplayer control module - spawns the player and drives it through its keyboard interface.
//!
//! Architecture:
//! - `process.rs` - Binary detection, argument building and process spawning
//! - `command.rs` - Keystroke command table
//! - `output.rs` - Background drain of the player's stdout
//! - `client.rs` - High-level player with session state and command methods

mod client;
mod command;
mod output;
mod process;

pub use client::{Player, PlayerError};
pub use command::Command;
pub use process::{
  find_player, player_args, PlayerExit, PlayerStdin, PlayerStdout, ProcessError, SpawnedPlayer,
  Spawner, SystemSpawner, DEFAULT_BINARY,
};
