//! Live order feed over WebSocket
//!
//! GET /api/v1/orders/live?token=<JWT>
//!
//! Browsers cannot set an Authorization header on a WebSocket, so the JWT
//! travels in the query string. Every `OrderEvent` published by the services
//! is forwarded as a JSON text frame; kitchen accounts only receive the
//! events their screen renders.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::models::OrderEvent;
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::error::AppResult;
use crate::middleware::auth::{authenticate, AuthUser};
use crate::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct LiveQuery {
    token: String,
}

pub async fn order_feed(
    State(state): State<AppState>,
    Query(query): Query<LiveQuery>,
    ws: WebSocketUpgrade,
) -> AppResult<impl IntoResponse> {
    let user = authenticate(&query.token, &state.config.jwt.secret)?;
    Ok(ws.on_upgrade(move |socket| live_session(socket, state, user)))
}

async fn live_session(socket: WebSocket, state: AppState, user: AuthUser) {
    let (mut sink, mut stream) = socket.split();
    let mut hub_rx = state.live.subscribe();
    let kitchen_only = user.role.is_kitchen() && !user.role.is_manager();

    tracing::info!(user = %user.username, role = %user.role, "Live feed connected");

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            event = hub_rx.recv() => {
                match event {
                    Ok(event) => {
                        if kitchen_only && !event.concerns_kitchen() {
                            continue;
                        }
                        if send_event(&mut sink, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(user = %user.username, missed, "Live subscriber lagged, requesting resync");
                        hub_rx = state.live.subscribe();
                        if send_event(&mut sink, &OrderEvent::Resync).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    // Clients only listen
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    tracing::info!(user = %user.username, "Live feed disconnected");
}

async fn send_event<S>(sink: &mut S, event: &OrderEvent) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let json = serde_json::to_string(event).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode order event");
    })?;
    sink.send(Message::Text(json)).await.map_err(|_| ())
}
