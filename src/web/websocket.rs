use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Fan-out of dashboard snapshots to connected WebSocket clients.
pub struct WebSocketHandler {
    broadcast_tx: broadcast::Sender<String>,
}

impl WebSocketHandler {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(256);
        Self { broadcast_tx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcast_tx.receiver_count()
    }

    pub fn broadcast(&self, message: String) {
        // A send error only means nobody is listening right now.
        let _ = self.broadcast_tx.send(message);
    }

    pub async fn handle_connection(&self, socket: WebSocket) {
        let connection_id = Uuid::new_v4().to_string();
        info!("New WebSocket connection: {}", connection_id);

        let mut broadcast_rx = self.broadcast_tx.subscribe();
        let (mut sender, mut receiver) = socket.split();

        let send_task = tokio::spawn(async move {
            while let Ok(msg) = broadcast_rx.recv().await {
                if sender.send(Message::Text(msg)).await.is_err() {
                    break;
                }
            }
        });

        let recv_connection_id = connection_id.clone();
        let recv_task = tokio::spawn(async move {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        debug!("Message from {}: {}", recv_connection_id, text);
                    }
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
        });

        tokio::select! {
            _ = send_task => {},
            _ = recv_task => {},
        }

        info!("WebSocket connection closed: {}", connection_id);
    }
}

impl Default for WebSocketHandler {
    fn default() -> Self {
        Self::new()
    }
}
