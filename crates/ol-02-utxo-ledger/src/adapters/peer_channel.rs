//! In-process peer transport over tokio channels

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

use crate::error::TransportError;
use crate::ports::{PeerMessage, PeerTransport};

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// One end of a bidirectional in-memory link
///
/// Created in connected pairs by [`ChannelTransport::pair`]. Dropping one
/// end makes the other end's `send`/`recv` fail with `Closed`.
pub struct ChannelTransport {
    tx: mpsc::Sender<PeerMessage>,
    rx: Mutex<mpsc::Receiver<PeerMessage>>,
    recv_timeout: Option<Duration>,
}

impl ChannelTransport {
    /// Two connected ends with the default capacity and no timeout
    pub fn pair() -> (Self, Self) {
        Self::pair_with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn pair_with_capacity(capacity: usize) -> (Self, Self) {
        let capacity = capacity.max(1);
        let (a_tx, b_rx) = mpsc::channel(capacity);
        let (b_tx, a_rx) = mpsc::channel(capacity);

        let a = Self {
            tx: a_tx,
            rx: Mutex::new(a_rx),
            recv_timeout: None,
        };
        let b = Self {
            tx: b_tx,
            rx: Mutex::new(b_rx),
            recv_timeout: None,
        };
        (a, b)
    }

    /// Fail `recv` with `Timeout` when nothing arrives within `timeout`
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl PeerTransport for ChannelTransport {
    async fn send(&self, message: PeerMessage) -> Result<(), TransportError> {
        trace!(kind = message.kind(), "Sending peer message");
        self.tx
            .send(message)
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&self) -> Result<PeerMessage, TransportError> {
        let mut rx = self.rx.lock().await;
        let message = match self.recv_timeout {
            Some(timeout) => tokio::time::timeout(timeout, rx.recv())
                .await
                .map_err(|_| TransportError::Timeout)?,
            None => rx.recv().await,
        };
        let message = message.ok_or(TransportError::Closed)?;
        trace!(kind = message.kind(), "Received peer message");
        Ok(message)
    }
}
