//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use murmur_realtime::connection::handle::{ConnectionHandle, OutboundFrame};
use murmur_realtime::connection::heartbeat::run_heartbeat;
use murmur_realtime::connection::state::Authenticated;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameter for WebSocket authentication.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Bearer access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}
///
/// The token is verified before the upgrade; failures answer 401 and no
/// session is registered.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let auth = match state
        .realtime
        .connections
        .authenticate(query.token.as_deref())
        .await
    {
        Ok(auth) => auth,
        Err(e) => return ApiError::from(e).into_response(),
    };

    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(state, auth, socket)),
        Err(rejection) => rejection.into_response(),
    }
}

/// Drives an established WebSocket until either side closes it.
async fn handle_socket(state: AppState, auth: Authenticated, socket: WebSocket) {
    let connections = Arc::clone(&state.realtime.connections);
    let (handle, outbound_rx) = connections.open(auth);
    let (ws_tx, mut ws_rx) = socket.split();

    let heartbeat = tokio::spawn(run_heartbeat(
        Arc::clone(&handle),
        connections.heartbeat_config(),
    ));
    let mut writer = tokio::spawn(write_loop(Arc::clone(&handle), outbound_rx, ws_tx));
    let mut writer_done = false;

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = &mut writer, if !writer_done => {
                writer_done = true;
                break;
            }
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => connections.handle_inbound(&handle, text.as_str()),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => handle.touch(),
                Some(Err(e)) => {
                    warn!(conn_id = %handle.id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    connections.close(&handle);
    heartbeat.abort();
    if !writer_done {
        let _ = writer.await;
    }
}

/// Forward queued frames to the socket, then send a close frame.
async fn write_loop(
    handle: Arc<ConnectionHandle>,
    mut outbound_rx: mpsc::Receiver<OutboundFrame>,
    mut ws_tx: SplitSink<WebSocket, Message>,
) {
    loop {
        let frame = tokio::select! {
            biased;
            frame = outbound_rx.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
            _ = handle.closed() => break,
        };
        let msg = match frame {
            OutboundFrame::Text(text) => Message::Text(text.into()),
            OutboundFrame::Ping => Message::Ping(Default::default()),
        };
        if let Err(e) = ws_tx.send(msg).await {
            debug!(conn_id = %handle.id, error = %e, "WebSocket write failed");
            return;
        }
    }
    let _ = ws_tx.send(Message::Close(None)).await;
}
