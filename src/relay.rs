//! Notification Relay
//!
//! Bridges token payloads from the BLE binding to the websocket connection
//! as JSON-RPC launch calls, one request per notification.

use crate::domain::rpc::LaunchRequest;
use crate::infrastructure::websocket::WsClient;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Consume payloads until the channel closes. Each payload becomes one
/// launch request with a fresh id; dispatch order matches arrival order.
pub async fn run(mut payloads: mpsc::UnboundedReceiver<Vec<u8>>, socket: WsClient) {
    while let Some(payload) = payloads.recv().await {
        let request = LaunchRequest::for_payload(&payload);
        match request.to_json() {
            Ok(json) => {
                info!("Launching token: {}", request.params.text);
                socket.send_text(json);
            }
            Err(e) => warn!("Failed to serialize launch request: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::Message;

    #[tokio::test]
    async fn test_payloads_relay_in_order() {
        let (payload_tx, payload_rx) = mpsc::unbounded_channel();
        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel();
        let socket = WsClient::with_sender(frame_tx);

        for payload in [b"A", b"B", b"C"] {
            payload_tx.send(payload.to_vec()).unwrap();
        }
        drop(payload_tx);
        run(payload_rx, socket).await;

        let mut texts = Vec::new();
        while let Ok(frame) = frame_rx.try_recv() {
            let Message::Text(json) = frame else {
                panic!("expected a text frame, got {:?}", frame);
            };
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["jsonrpc"], "2.0");
            assert_eq!(value["method"], "launch");
            texts.push(value["params"]["text"].as_str().unwrap().to_string());
        }
        assert_eq!(texts, ["A", "B", "C"]);
    }
}
