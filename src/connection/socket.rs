//! WebSocket Endpoint Implementation

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::connection::ConnectionLifecycleHandler;
use crate::events::ClientEvent;
use crate::http::AppState;
use crate::presence::ConnectionId;

/// `GET /ws` upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one connection from upgrade to teardown.
///
/// Outbound traffic goes through an unbounded channel drained by a forwarder
/// task, so broadcasts from other connections never block on this socket.
/// Inbound frames are handled one at a time in arrival order, which is what
/// lets the lifecycle handler stay lock-free internally.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id: ConnectionId = Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "websocket connection established");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    state.hub.register(conn_id.clone(), tx).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if ws_tx.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut handler = ConnectionLifecycleHandler::new(
        conn_id.clone(),
        state.registry.clone(),
        state.broadcaster.clone(),
        state.dispatcher.clone(),
    );

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientEvent>(&text) {
                            Ok(event) => handler.handle_event(event).await,
                            // No rejection path: frames we cannot parse are
                            // dropped without echoing anything to the sender.
                            Err(e) => {
                                warn!(conn_id = %conn_id, error = %e, "ignoring unparseable frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        debug!(conn_id = %conn_id, "client closed connection");
                        break;
                    }
                    // Ping/pong is answered at the protocol level; binary
                    // frames carry nothing we speak.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(conn_id = %conn_id, error = %e, "websocket error");
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut send_task => break,
        }
    }

    handler.handle_disconnect().await;
    state.hub.unregister(&conn_id).await;
    send_task.abort();
}
