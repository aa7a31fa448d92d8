//! The persistent-connection protocol: join gate, reader/writer tasks,
//! dispatch, and broadcast fan-out.
//!
//! Each upgraded connection runs two tasks: the reader (this module's loop,
//! driving protocol handling) and a writer draining the player's mailbox to
//! the socket. The mailbox is owned by the session entry — a reconnect
//! rebinds it, and the superseded writer exits when its receiver closes.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;

use parlor_protocol::{frame_type, ActionPayload, Frame, JoinPayload, SessionStatus, StatePayload};
use parlor_session::{mailbox, Mailbox, Session};

use crate::server::AppState;

/// `GET /api/sessions/{code}/stream` — upgrades to the play protocol.
///
/// Unknown codes are rejected with a plain 404 before the upgrade happens.
pub(crate) async fn stream(
    ws: WebSocketUpgrade,
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let Some(session) = state.manager.get(&code).await else {
        return (StatusCode::NOT_FOUND, "session not found").into_response();
    };
    ws.on_upgrade(move |socket| handle_stream(socket, state, session))
}

async fn handle_stream(socket: WebSocket, state: AppState, session: Arc<Session>) {
    let (mut sink, mut stream) = socket.split();

    // --- Join gate: the first frame MUST be a well-formed join. ---
    let Some(first) = read_data_frame(&mut stream).await else {
        return;
    };
    let frame = match Frame::decode(&first) {
        Ok(frame) if frame.kind == frame_type::JOIN => frame,
        _ => {
            reject(&mut sink, Frame::error("first message must be a join")).await;
            return;
        }
    };
    let player_id = match frame.payload_as::<JoinPayload>() {
        Ok(join) if !join.player_id.is_empty() => join.player_id,
        _ => {
            reject(&mut sink, Frame::error("invalid join payload")).await;
            return;
        }
    };

    // Rebind an existing player's mailbox, or add them as a new player.
    let (tx, mut rx) = mailbox();
    if !session.connect_player(&player_id, tx.clone()).await {
        if let Err(e) = session.add_player(&player_id).await {
            reject(&mut sink, Frame::error(e.to_string())).await;
            return;
        }
        session.connect_player(&player_id, tx.clone()).await;
        if let Err(e) = state.manager.save_roster(&session).await {
            tracing::warn!(code = %session.code(), error = %e, "save roster failed");
        }
    }

    tracing::info!(code = %session.code(), player_id, "player connected");

    // The roster changed — everyone gets a fresh snapshot.
    broadcast_state(&session).await;

    // Writer task: drain the mailbox to the wire. Exits when the mailbox is
    // rebound (receiver closes) or the socket goes away.
    tokio::spawn(async move {
        while let Some(bytes) = rx.recv().await {
            let Ok(text) = String::from_utf8(bytes) else {
                continue;
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Reader loop: frames are processed in arrival order.
    while let Some(data) = read_data_frame(&mut stream).await {
        match Frame::decode(&data) {
            Ok(frame) => dispatch(&state, &session, &player_id, &tx, frame).await,
            Err(_) => deliver_error(&tx, "invalid message"),
        }
    }

    // The player is NOT removed — they may reconnect and rebind the
    // mailbox.
    tracing::info!(code = %session.code(), player_id, "player disconnected");
}

/// Reads the next text or binary frame, skipping pings/pongs. `None` when
/// the peer is gone.
async fn read_data_frame(stream: &mut SplitStream<WebSocket>) -> Option<Vec<u8>> {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => return Some(text.as_bytes().to_vec()),
            Ok(Message::Binary(bytes)) => return Some(bytes.to_vec()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

async fn dispatch(
    state: &AppState,
    session: &Arc<Session>,
    player_id: &str,
    mailbox: &Mailbox,
    frame: Frame,
) {
    match frame.kind.as_str() {
        frame_type::ACTION => {
            let payload = match frame.payload_as::<ActionPayload>() {
                Ok(payload) => payload,
                Err(_) => {
                    deliver_error(mailbox, "invalid action payload");
                    return;
                }
            };

            // The write lock spans apply → terminal check → status flip so
            // a terminal state cannot race with another action.
            {
                let mut guard = session.write().await;
                let over = match guard.current_match.as_mut() {
                    None => {
                        drop(guard);
                        deliver_error(mailbox, "game not started");
                        return;
                    }
                    Some(current) => {
                        if let Err(reason) = current.apply_action(player_id, payload.action) {
                            drop(guard);
                            deliver_error(mailbox, reason);
                            return;
                        }
                        current.is_over()
                    }
                };
                if over {
                    guard.status = SessionStatus::Finished;
                }
            }

            // The action already took effect in memory; persistence is
            // best-effort per operation and the broadcast still fires.
            if let Err(e) = state.manager.save_match_state(session).await {
                tracing::error!(code = %session.code(), error = %e, "save match state failed");
            }
            broadcast_state(session).await;
        }

        frame_type::START => {
            let is_host = session.read().await.host_id.as_deref() == Some(player_id);
            if !is_host {
                deliver_error(mailbox, "only the host can start");
                return;
            }
            if let Err(e) = session.start().await {
                deliver_error(mailbox, e.to_string());
                return;
            }
            if let Err(e) = state.manager.save_match_state(session).await {
                tracing::error!(code = %session.code(), error = %e, "save match state failed");
            }
            broadcast_state(session).await;
        }

        other => deliver_error(mailbox, format!("unknown message type: {other}")),
    }
}

/// Builds and enqueues a per-recipient `state` frame for every player.
///
/// Frames are marshalled once per recipient (`state` and `validActions`
/// are viewer-specific) under the session read lock — pure compute plus a
/// non-blocking enqueue, never network I/O. A full mailbox drops its frame;
/// the next snapshot resynchronizes that recipient.
pub async fn broadcast_state(session: &Session) {
    let guard = session.read().await;
    let info = session.info_locked(&guard);

    for player in guard.players() {
        let mut payload = StatePayload {
            session_info: info.clone(),
            state: Value::Null,
            valid_actions: Vec::new(),
            results: None,
        };
        if guard.status != SessionStatus::Waiting {
            if let Some(current) = guard.current_match.as_ref() {
                payload.state = current.state(&player.id);
                payload.valid_actions = current.valid_actions(&player.id);
                if current.is_over() {
                    payload.results = Some(current.results());
                }
            }
        }

        match Frame::state(&payload).and_then(|frame| frame.encode()) {
            Ok(bytes) => player.deliver(bytes),
            Err(e) => {
                tracing::error!(
                    code = %session.code(),
                    player_id = %player.id,
                    error = %e,
                    "marshal state frame failed"
                );
            }
        }
    }
}

/// Enqueues an `error` frame for the offending connection only.
fn deliver_error(mailbox: &Mailbox, message: impl Into<String>) {
    if let Ok(bytes) = Frame::error(message).encode() {
        let _ = mailbox.try_send(bytes);
    }
}

/// Writes an `error` frame straight to the socket and closes it — used
/// before the player has a mailbox (join-gate failures).
async fn reject(sink: &mut SplitSink<WebSocket, Message>, frame: Frame) {
    if let Ok(bytes) = frame.encode() {
        if let Ok(text) = String::from_utf8(bytes) {
            let _ = sink.send(Message::Text(text.into())).await;
        }
    }
    let _ = sink.send(Message::Close(None)).await;
}
