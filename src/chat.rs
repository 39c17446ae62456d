//! Real-time chat room.
//!
//! Every text frame a client sends is rebroadcast to every connected client,
//! the sender included. There is no history: a client only sees messages
//! sent while it is connected. A client that falls too far behind skips the
//! messages it missed rather than slowing everybody else down.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Messages buffered per subscriber before it starts lagging.
pub const CHAT_CAPACITY: usize = 100;

/// Broadcast hub shared by all chat sockets. Cloning yields another handle to the same room.
#[derive(Debug, Clone)]
pub struct ChatRoom {
    tx: broadcast::Sender<String>,
}

impl Default for ChatRoom {
    fn default() -> Self {
        Self::new(CHAT_CAPACITY)
    }
}

impl ChatRoom {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Send `message` to every current subscriber. Returns how many received it.
    pub fn publish(&self, message: String) -> usize {
        // send only fails when nobody is subscribed
        self.tx.send(message).unwrap_or(0)
    }

    pub fn member_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// `GET /chat`: upgrade to a websocket and join the room.
pub async fn chat_socket(ws: WebSocketUpgrade, State(room): State<ChatRoom>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, room))
}

async fn handle_socket(socket: WebSocket, room: ChatRoom) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = room.subscribe();
    info!(members = room.member_count(), "User joined the chat");

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    if sender.send(Message::Text(message.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Chat client lagging; dropped messages");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let publisher = room.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(frame)) = receiver.next().await {
            match frame {
                Message::Text(text) => {
                    let delivered = publisher.publish(text.as_str().to_owned());
                    debug!(delivered, "Broadcast chat message");
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("User left the chat");
}
