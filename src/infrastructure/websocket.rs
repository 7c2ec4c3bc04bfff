//! Websocket Client Module
//!
//! Maintains the single outbound connection to the Zaparoo core API and runs
//! its inbound read loop for the life of the process.
//!
//! The connection is shared between the notification relay (writes) and the
//! read loop (pong replies). Both queue frames through one channel so that a
//! single task owns the sink and writes never interleave.

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

/// First frame sent after the handshake completes.
pub const GREETING: &str = "hello, there is client";

/// Handle to the outbound connection. Cloning shares the same connection;
/// there is exactly one per process run.
#[derive(Clone)]
pub struct WsClient {
    outbound: mpsc::UnboundedSender<Message>,
}

impl WsClient {
    /// Open the connection and start the writer and read-loop tasks.
    ///
    /// Must complete before any BLE activity starts so the socket is
    /// writable by the time the first notification arrives. Handshake
    /// failure is fatal; anything after it is logged and survived.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url)
            .await
            .with_context(|| format!("connect to websocket endpoint {url}"))?;
        info!("Websocket connected: {}", url);

        let (mut sink, mut inbound) = stream.split();
        let (outbound, mut pending) = mpsc::unbounded_channel::<Message>();

        // Writer task: sole owner of the sink.
        tokio::spawn(async move {
            while let Some(message) = pending.recv().await {
                if let Err(e) = sink.send(message).await {
                    warn!("Websocket write failed: {}", e);
                }
            }
        });

        // Read loop: logs inbound frames and keeps the protocol alive.
        let reader_outbound = outbound.clone();
        tokio::spawn(async move {
            while let Some(frame) = inbound.next().await {
                match frame {
                    Ok(Message::Text(text)) => info!("recv: {}", text),
                    Ok(Message::Close(reason)) => {
                        warn!("Websocket closed: {:?}", reason);
                        break;
                    }
                    Ok(other) => {
                        if let Some(reply) = reply_for(&other) {
                            let _ = reader_outbound.send(reply);
                        }
                    }
                    Err(e) => {
                        warn!("Websocket read failed: {}", e);
                        break;
                    }
                }
            }
            info!("Websocket read loop finished");
        });

        let client = Self { outbound };
        client.send_text(GREETING.to_string());
        Ok(client)
    }

    /// Queue a text frame. Write failures after the connection has died are
    /// logged by the writer task; the bridge keeps running regardless.
    pub fn send_text(&self, text: String) {
        let _ = self.outbound.send(Message::Text(text));
    }

    #[cfg(test)]
    pub(crate) fn with_sender(outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self { outbound }
    }
}

/// Protocol-mandated reply for an inbound frame, if any. Pings are answered
/// with a pong carrying the identical payload; pongs need no reply.
fn reply_for(frame: &Message) -> Option<Message> {
    match frame {
        Message::Ping(payload) => Some(Message::Pong(payload.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_is_answered_with_matching_pong() {
        let reply = reply_for(&Message::Ping(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(reply, Some(Message::Pong(vec![0xde, 0xad, 0xbe, 0xef])));
    }

    #[test]
    fn test_pong_and_binary_frames_get_no_reply() {
        assert_eq!(reply_for(&Message::Pong(vec![1])), None);
        assert_eq!(reply_for(&Message::Binary(vec![1, 2, 3])), None);
    }
}
