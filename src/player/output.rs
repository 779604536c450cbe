//! Background drain of the player's stdout.
//!
//! omxplayer blocks once its stdout pipe fills up, so the pipe is read for the
//! whole session whether or not anyone is interested in the text.

use std::time::Duration;

use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::process::PlayerStdout;

/// How long to let the drain flush remaining output after the process exits.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

pub(crate) struct OutputDrain {
  cancel: CancellationToken,
  handle: JoinHandle<()>,
}

impl OutputDrain {
  /// Start draining `stdout`, forwarding each line to the log and to `sink`.
  pub(crate) fn spawn(stdout: PlayerStdout, sink: Option<Sender<String>>) -> Self {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move {
      Self::drain_loop(stdout, sink, token).await;
    });
    Self { cancel, handle }
  }

  async fn drain_loop(stdout: PlayerStdout, sink: Option<Sender<String>>, cancel: CancellationToken) {
    log::debug!("Player output drain started");
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();

    loop {
      buf.clear();
      let read = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
          log::debug!("Player output drain cancelled");
          break;
        }
        read = reader.read_until(b'\n', &mut buf) => read,
      };

      match read {
        Ok(0) => {
          log::debug!("Player output closed");
          break;
        }
        Ok(_) => {
          // The player prints whatever the media metadata contains, so decode lossily.
          let line = String::from_utf8_lossy(&buf);
          let line = line.trim_end_matches(['\n', '\r']);
          log::info!("[omxplayer] {}", line);

          if let Some(sink) = &sink {
            if let Err(e) = sink.try_send(line.to_string()) {
              log::trace!("Dropped player output line: {}", e);
            }
          }
        }
        Err(e) => {
          log::warn!("Player output read error: {}", e);
          break;
        }
      }
    }
  }

  /// Wait briefly for the drain to reach end of stream, then cancel and join it.
  pub(crate) async fn shutdown(mut self) {
    let joined = match tokio::time::timeout(DRAIN_GRACE, &mut self.handle).await {
      Ok(joined) => joined,
      Err(_) => {
        log::debug!("Player output still open after exit, cancelling drain");
        self.cancel.cancel();
        self.handle.await
      }
    };
    if let Err(e) = joined {
      log::error!("Player output drain panicked: {}", e);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::AsyncWriteExt;

  #[tokio::test]
  async fn test_lines_forwarded_to_sink() {
    let (mut remote, local) = tokio::io::duplex(64);
    let (tx, rx) = async_channel::unbounded();
    let drain = OutputDrain::spawn(Box::pin(local), Some(tx));

    remote.write_all(b"Video codec omx-h264\r\nAudio codec aac\npartial").await.unwrap();
    drop(remote);
    drain.shutdown().await;

    assert_eq!(rx.recv().await.unwrap(), "Video codec omx-h264");
    assert_eq!(rx.recv().await.unwrap(), "Audio codec aac");
    assert_eq!(rx.recv().await.unwrap(), "partial");
    assert!(rx.is_empty());
  }

  #[tokio::test]
  async fn test_full_sink_does_not_stall() {
    let (mut remote, local) = tokio::io::duplex(64);
    let (tx, rx) = async_channel::bounded(1);
    let drain = OutputDrain::spawn(Box::pin(local), Some(tx));

    for i in 0..50 {
      remote.write_all(format!("line {}\n", i).as_bytes()).await.unwrap();
    }
    drop(remote);
    drain.shutdown().await;

    assert_eq!(rx.recv().await.unwrap(), "line 0");
  }

  #[tokio::test]
  async fn test_open_stream_is_cancelled() {
    let (_remote, local) = tokio::io::duplex(64);
    let drain = OutputDrain::spawn(Box::pin(local), None);
    // _remote stays open, so only cancellation can end the task.
    drain.shutdown().await;
  }
}
