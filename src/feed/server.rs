//! The WebSocket fan-out server.
//!
//! One endpoint, `/ws`, subscribes every client to all three topics;
//! `/health` answers liveness probes. Frames arrive pre-serialized from
//! the feed's poll threads, so the handlers only forward strings.

use super::FeedChannels;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

/// Build the broadcaster's HTTP router.
#[must_use]
pub fn router(channels: FeedChannels) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(channels)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": crate::utils::current_time_nanos() / 1_000_000,
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(channels): State<FeedChannels>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, channels))
}

/// Forward all three topics to one client until it disconnects.
///
/// A client that cannot keep up lags its broadcast receivers and skips
/// frames; it never slows the shared-memory polls or other clients.
async fn handle_socket(socket: WebSocket, channels: FeedChannels) {
    info!("client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut orderbook_rx = channels.orderbook.subscribe();
    let mut metrics_rx = channels.metrics.subscribe();
    let mut trades_rx = channels.trades.subscribe();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }

            frame = orderbook_rx.recv() => {
                if forward(&mut sender, frame).await.is_err() {
                    break;
                }
            }

            frame = metrics_rx.recv() => {
                if forward(&mut sender, frame).await.is_err() {
                    break;
                }
            }

            frame = trades_rx.recv() => {
                if forward(&mut sender, frame).await.is_err() {
                    break;
                }
            }
        }
    }

    info!("client disconnected");
}

async fn forward(
    sender: &mut (impl SinkExt<Message> + Unpin),
    frame: Result<String, RecvError>,
) -> Result<(), ()> {
    match frame {
        Ok(json) => sender.send(Message::Text(json)).await.map_err(|_| ()),
        Err(RecvError::Lagged(skipped)) => {
            debug!("client lagged, skipped {skipped} frames");
            Ok(())
        }
        Err(RecvError::Closed) => Err(()),
    }
}
