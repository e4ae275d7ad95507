//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single dashboard connection: client
//! commands go to the [`RealtimeService`], shared-channel events are
//! forwarded once the session is authenticated, and room events are
//! forwarded for the rooms the connection has joined. The room channel is
//! only subscribed once the connection joins its first room.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::ClientMessage;
use crate::domain::admin_event::{AuthAck, RoomEventPayload};
use crate::domain::{AdminEvent, ConnectionSession};
use crate::error::RealtimeError;
use crate::service::RealtimeService;

type WsSink = SplitSink<WebSocket, Message>;
type RoomReceiver = Option<broadcast::Receiver<RoomEventPayload>>;

enum Step {
    Inbound(String),
    Outbound(AdminEvent),
    Ignore,
    Close,
}

/// Runs the read/write loop for a single WebSocket connection.
///
/// Returns when the client disconnects or a write fails; the session is
/// always closed on the way out.
pub async fn run_connection(socket: WebSocket, service: Arc<RealtimeService>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut session = service.open_session();
    let mut room_rx: RoomReceiver = None;

    loop {
        let step = tokio::select! {
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => Step::Inbound(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | None => Step::Close,
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %session.id(), error = %e, "ws read failed");
                    Step::Close
                }
                Some(Ok(_)) => Step::Ignore,
            },
            event = session.recv_admin_event() => match event {
                Ok(event) => Step::Outbound(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(connection_id = %session.id(), lagged = n, "admin client lagged behind event bus");
                    Step::Ignore
                }
                Err(broadcast::error::RecvError::Closed) => Step::Close,
            },
            event = recv_room_event(&mut room_rx) => match event {
                Ok(event) => match forward_room_event(&service, &session, event).await {
                    Some(event) => Step::Outbound(event),
                    None => Step::Ignore,
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(connection_id = %session.id(), lagged = n, "client lagged behind room events");
                    Step::Ignore
                }
                Err(broadcast::error::RecvError::Closed) => Step::Close,
            },
        };

        let delivered = match step {
            Step::Inbound(text) => {
                let replies = handle_text_message(&service, &mut session, &mut room_rx, &text).await;
                send_all(&mut ws_tx, replies).await
            }
            Step::Outbound(event) => send_event(&mut ws_tx, &event).await,
            Step::Ignore => true,
            Step::Close => false,
        };
        if !delivered {
            break;
        }
    }

    drop(room_rx);
    service.close_session(session).await;
}

/// Waits for the next room event. Never resolves before the first join.
async fn recv_room_event(
    room_rx: &mut RoomReceiver,
) -> Result<RoomEventPayload, broadcast::error::RecvError> {
    match room_rx.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Wraps a room event for this connection if it is a member of the room.
async fn forward_room_event(
    service: &RealtimeService,
    session: &ConnectionSession,
    event: RoomEventPayload,
) -> Option<AdminEvent> {
    service
        .rooms()
        .is_member(session.id(), &event.room)
        .await
        .then(|| AdminEvent::RoomEvent(event))
}

/// Dispatches one client frame and returns the replies for this connection.
async fn handle_text_message(
    service: &RealtimeService,
    session: &mut ConnectionSession,
    room_rx: &mut RoomReceiver,
    text: &str,
) -> Vec<AdminEvent> {
    let msg = match ClientMessage::parse(text) {
        Ok(msg) => msg,
        Err(RealtimeError::InvalidCredentials) => {
            tracing::warn!(connection_id = %session.id(), "undecodable authenticate frame");
            return vec![AdminEvent::Authenticated(AuthAck::rejected(
                AuthAck::INVALID_CREDENTIALS,
            ))];
        }
        Err(e) => {
            tracing::debug!(connection_id = %session.id(), error = %e, "rejected client frame");
            return vec![AdminEvent::error(e.error_code(), e.to_string())];
        }
    };

    match msg {
        ClientMessage::Authenticate(req) => {
            service
                .authenticate(session, req.user_id, &req.token)
                .await
        }
        ClientMessage::JoinRoom(req) => {
            room_rx.get_or_insert_with(|| service.event_bus().subscribe_rooms());
            vec![service.join_room(session, &req.room_type, &req.id).await]
        }
        ClientMessage::LeaveRoom(req) => {
            vec![service.leave_room(session, &req.room_type, &req.id).await]
        }
        ClientMessage::SetPreferences(req) => {
            vec![service.set_preferences(session, req.preferences).await]
        }
    }
}

async fn send_all(ws_tx: &mut WsSink, events: Vec<AdminEvent>) -> bool {
    for event in &events {
        if !send_event(ws_tx, event).await {
            return false;
        }
    }
    true
}

/// Writes one event as a JSON text frame. Returns `false` if the socket is gone.
async fn send_event(ws_tx: &mut WsSink, event: &AdminEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(event = event.name(), error = %e, "failed to encode event");
            return true;
        }
    };
    ws_tx.send(Message::text(json)).await.is_ok()
}
