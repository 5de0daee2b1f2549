//! WebSocket connection handling.
//!
//! Each connection gets its own [`Observer`] and receives every fanout event
//! as a text frame `{"event": name, "data": payload}`. A lagging connection
//! gets `{"event": "missed", "data": count}` instead of the dropped events.
//! Messages sent by the client are not interpreted; mutations go through the
//! HTTP routes.

use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use log::{debug, info, warn};
use serde_json::json;
use uuid::Uuid;

use crate::fanout::{Delivery, Observer};

/// Unique client identifier, used in logs only.
pub type ClientId = Uuid;

struct ConnectionHandler {
    client_id: ClientId,
    observer: Observer,
}

pub(crate) async fn handle_connection(socket: WebSocket, observer: Observer) {
    let client_id = Uuid::new_v4();
    info!("websocket client {client_id} connected");

    let mut handler = ConnectionHandler { client_id, observer };
    match handler.run(socket).await {
        Ok(()) => info!("websocket client {client_id} disconnected"),
        Err(err) => warn!("websocket client {client_id} dropped: {err}"),
    }
}

impl ConnectionHandler {
    async fn run(&mut self, mut socket: WebSocket) -> Result<()> {
        loop {
            tokio::select! {
                delivery = self.observer.recv() => {
                    let Some(delivery) = delivery else {
                        debug!("fanout closed, ending session for {}", self.client_id);
                        let _ = socket.send(Message::Close(None)).await;
                        return Ok(());
                    };
                    self.forward(&mut socket, delivery).await?;
                }
                incoming = socket.next() => {
                    match incoming {
                        Some(Ok(Message::Ping(data))) => socket.send(Message::Pong(data)).await?,
                        Some(Ok(Message::Close(frame))) => {
                            debug!("client {} closed connection: {frame:?}", self.client_id);
                            return Ok(());
                        }
                        Some(Ok(Message::Text(text))) => {
                            debug!("ignoring message from {}: {text}", self.client_id);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => return Err(err.into()),
                        None => return Ok(()),
                    }
                }
            }
        }
    }

    async fn forward(&self, socket: &mut WebSocket, delivery: Delivery) -> Result<()> {
        match &delivery {
            Delivery::Event(event) => debug!("sending {} to {}", event.name(), self.client_id),
            Delivery::Missed(missed) => warn!("client {} lagged and missed {missed} event(s)", self.client_id),
        }
        socket.send(Message::Text(frame_text(&delivery)?)).await?;
        Ok(())
    }
}

/// Text frame sent for one delivery.
pub(crate) fn frame_text(delivery: &Delivery) -> serde_json::Result<String> {
    match delivery {
        Delivery::Event(event) => serde_json::to_string(event),
        Delivery::Missed(missed) => serde_json::to_string(&json!({"event": "missed", "data": missed})),
    }
}
