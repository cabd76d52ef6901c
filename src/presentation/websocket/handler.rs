//! WebSocket Connection Handler
//!
//! Connection lifecycle: Hello → Identify (JWT) → `ready` → event loop.
//! Client events arrive as Dispatch frames and are routed through the
//! [`Dispatcher`](super::dispatcher::Dispatcher); server events are the
//! notifications published to the [`Gateway`](super::gateway::Gateway)
//! whose audience includes this session's user.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout};
use uuid::Uuid;

use super::messages::{GatewayReceive, GatewaySend, IdentifyPayload, OpCode, ReadyPayload};
use super::session::SessionState;
use crate::application::dto::UserResponse;
use crate::application::services::UserDto;
use crate::presentation::middleware::verify_token;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Grace period on top of the heartbeat interval before a session is dropped
const HEARTBEAT_GRACE_MS: u64 = 10_000;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let limits = &state.settings.websocket;
    ws.max_message_size(limits.max_message_size)
        .max_frame_size(limits.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    state.gateway.connection_opened();
    let session_id = Uuid::new_v4().to_string();
    tracing::debug!(session_id = %session_id, "New WebSocket connection");

    run_session(socket, &state, &session_id).await;

    state.gateway.unregister_session(&session_id);
    state.gateway.connection_closed();
}

async fn run_session(socket: WebSocket, state: &AppState, session_id: &str) {
    // Split socket for concurrent read/write
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<GatewaySend>();

    let hello = GatewaySend::hello(state.gateway.heartbeat_interval());
    let hello_sent = match serde_json::to_string(&hello) {
        Ok(text) => sender.send(Message::Text(text.into())).await.is_ok(),
        Err(_) => false,
    };
    if !hello_sent {
        tracing::debug!(session_id = %session_id, "Failed to send Hello");
        return;
    }

    // Forward queued frames to the socket
    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize gateway frame");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Wait for Identify (with timeout)
    let identify_timeout = Duration::from_secs(state.settings.websocket.identify_timeout_secs);
    let identify = match timeout(identify_timeout, wait_for_identify(&mut receiver)).await {
        Ok(Some(identify)) => identify,
        Ok(None) => {
            tracing::debug!(session_id = %session_id, "Connection closed before Identify");
            sender_task.abort();
            return;
        }
        Err(_) => {
            tracing::debug!(session_id = %session_id, "Identify timeout");
            reject(&tx, sender_task).await;
            return;
        }
    };

    let (user_id, user, unread_mentions) = match identify_user(&identify.token, state).await {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!(session_id = %session_id, error = %e, "Identify rejected");
            reject(&tx, sender_task).await;
            return;
        }
    };

    let mut session = SessionState::new(session_id.to_string(), user_id);

    // Subscribe before announcing readiness so no event slips between the two
    let mut event_rx = state.gateway.subscribe();
    state.gateway.register_session(session_id.to_string(), user_id);

    let ready = ReadyPayload {
        user: UserResponse::from(user),
        session_id: session_id.to_string(),
        unread_mentions,
    };
    let ready_sent = match serde_json::to_value(&ready) {
        Ok(d) => tx.send(GatewaySend::dispatch("ready", d, session.next_sequence())).is_ok(),
        Err(_) => false,
    };
    if !ready_sent {
        sender_task.abort();
        return;
    }

    tracing::info!(user_id = user_id, session_id = %session_id, "User connected and identified");

    let heartbeat_timeout_ms = state.gateway.heartbeat_interval() + HEARTBEAT_GRACE_MS;
    let mut heartbeat_check = interval(Duration::from_millis(heartbeat_timeout_ms));
    heartbeat_check.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_frame(&text, &mut session, &tx, state).await {
                            tracing::debug!(session_id = %session_id, error = %e, "Error handling frame");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    // Pings are answered by axum
                    Some(Ok(_)) => {}
                }
            }

            event = event_rx.recv() => {
                match event {
                    Ok(routed) if routed.is_for(user_id) => {
                        let frame = GatewaySend::event(&routed.event, session.next_sequence());
                        if tx.send(frame).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(session_id = %session_id, skipped = n, "Event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::error!("Gateway event channel closed");
                        break;
                    }
                }
            }

            _ = heartbeat_check.tick() => {
                if !session.is_alive(heartbeat_timeout_ms) {
                    tracing::info!(session_id = %session_id, "Heartbeat timeout, closing connection");
                    break;
                }
            }
        }
    }

    sender_task.abort();
    tracing::info!(user_id = user_id, session_id = %session_id, "User disconnected");
}

/// Read frames until an Identify arrives or the socket closes.
async fn wait_for_identify<S>(receiver: &mut S) -> Option<IdentifyPayload>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let Ok(frame) = serde_json::from_str::<GatewayReceive>(&text) else {
                    continue;
                };
                if OpCode::from_u8(frame.op) != Some(OpCode::Identify) {
                    continue;
                }
                if let Some(identify) = frame.d.and_then(|d| serde_json::from_value(d).ok()) {
                    return Some(identify);
                }
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

/// Resolve the token to a known user plus their unread mention count.
async fn identify_user(token: &str, state: &AppState) -> Result<(i64, UserDto, u64), AppError> {
    let user_id = verify_token(&state.settings.jwt.secret, token)?;

    let user = state
        .directory
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".into()))?;
    let unread = state.mentions.unread_count(user_id).await?;

    Ok((user_id, UserDto::from(user), unread))
}

/// Send InvalidSession and give the writer a moment to flush it.
async fn reject(tx: &mpsc::UnboundedSender<GatewaySend>, sender_task: JoinHandle<()>) {
    let _ = tx.send(GatewaySend::invalid_session());
    tokio::time::sleep(Duration::from_millis(100)).await;
    sender_task.abort();
}

/// Handle one frame from an identified session
async fn handle_frame(
    text: &str,
    session: &mut SessionState,
    tx: &mpsc::UnboundedSender<GatewaySend>,
    state: &AppState,
) -> Result<(), AppError> {
    let frame: GatewayReceive = serde_json::from_str(text)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {}", e)))?;

    match OpCode::from_u8(frame.op) {
        Some(OpCode::Heartbeat) => {
            session.heartbeat();
            let _ = tx.send(GatewaySend::heartbeat_ack());
            tracing::trace!(session_id = %session.session_id, "Heartbeat received");
        }

        Some(OpCode::Dispatch) => {
            let event = frame
                .t
                .ok_or_else(|| AppError::BadRequest("Missing event name".into()))?;
            let data = frame.d.unwrap_or(Value::Null);

            if let Err(e) = state
                .dispatcher
                .dispatch(state, session.user_id, &event, data)
                .await
            {
                let _ = tx.send(GatewaySend::error(&event, &e, session.next_sequence()));
                return Err(e);
            }
        }

        Some(OpCode::Identify) => {
            tracing::debug!(session_id = %session.session_id, "Ignoring repeated Identify");
        }

        _ => {
            tracing::debug!(session_id = %session.session_id, op = frame.op, "Unknown opcode");
        }
    }

    Ok(())
}
