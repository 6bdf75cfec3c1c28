//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionHandle, Identity, MessageId, Payload, UserId},
    infrastructure::dto::websocket::{ClientCommand, encode_frame},
    ui::{
        protocol_error::{
            ProtocolError, STATUS_BAD_REQUEST, STATUS_TOO_SLOW, close_code, render_error_frame,
        },
        state::{AppState, ConnectQuery},
    },
    usecase::ParticipantSession,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Convert i64 -> UserId (Domain Model)
    let user_id = match UserId::new(query.user_id) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Invalid user_id '{}': {}", query.user_id, e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Only resolve here; the connection joins fan-out once the upgrade completes
    match state.connect_usecase().resolve(user_id).await {
        Ok(identity) => Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, identity))),
        Err(e) => {
            let error = ProtocolError::from(e);
            tracing::warn!(user = %user_id, status = error.status_code(), "Connection rejected");
            Err(StatusCode::from_u16(error.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, identity: Identity) {
    // Bounded channel: a reader that falls this far behind is evicted
    let (connection, rx) = ConnectionHandle::channel(state.delivery_buffer);
    let mut session = state.connect_usecase().execute(identity, connection).await;

    let (sender, mut receiver) = socket.split();
    let user_id = session.identity().id;
    let conn_id = session.connection().id();
    tracing::info!(user = %user_id, conn_id = %conn_id, "WebSocket session started");

    // Frames from the broadcast engine go out through this task
    let mut send_task = tokio::spawn(forward_frames(sender, rx, session.connection().clone()));

    // If either side completes, stop the other
    tokio::select! {
        _ = process_commands(&mut receiver, &state, &mut session) => send_task.abort(),
        _ = &mut send_task => {},
    };

    state.disconnect_usecase().execute(session).await;
    tracing::info!(user = %user_id, conn_id = %conn_id, "WebSocket session ended");
}

/// Drain the connection's queue into the socket until it closes or is evicted.
async fn forward_frames(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Payload>,
    connection: ConnectionHandle,
) {
    loop {
        tokio::select! {
            biased;
            _ = connection.evicted() => {
                let error = ProtocolError::new(STATUS_TOO_SLOW, "Connection too slow");
                tracing::warn!(conn_id = %connection.id(), "Closing slow connection");
                let frame = CloseFrame {
                    code: close_code(&error),
                    reason: error.reason_phrase().to_string().into(),
                };
                let _ = sender.send(Message::Close(Some(frame))).await;
                break;
            }
            payload = rx.recv() => {
                let Some(payload) = payload else { break };
                if sender.send(Message::Text(payload.to_string().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Read client commands until the socket closes.
async fn process_commands(
    receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
    session: &mut ParticipantSession,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!(user = %session.identity().id, "Received text: {}", text.as_str());
                if let Err(error) = handle_command(state, session, text.as_str()).await {
                    report_error(session, &error);
                }
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!(user = %session.identity().id, "Client requested close");
                break;
            }
            _ => {}
        }
    }
}

async fn handle_command(
    state: &AppState,
    session: &mut ParticipantSession,
    text: &str,
) -> Result<(), ProtocolError> {
    let command = serde_json::from_str::<ClientCommand>(text).map_err(|e| {
        tracing::warn!("Failed to parse command: {}", e);
        ProtocolError::new(STATUS_BAD_REQUEST, format!("Malformed command: {e}"))
    })?;
    let user_id = session.identity().id;

    match command {
        ClientCommand::Send {
            recipient,
            body,
            message_type,
        } => {
            let recipient = UserId::new(recipient)?;
            state
                .create_message_usecase()
                .execute(user_id, recipient, &body, message_type)
                .await?;
        }
        ClientCommand::Edit { message, body } => {
            let id = MessageId::new(message)?;
            state
                .update_message_usecase()
                .execute(user_id, id, &body)
                .await?;
        }
        ClientCommand::Join { room } => {
            state.join_room_usecase().execute(session, room).await?;
        }
        ClientCommand::Leave { room } => {
            state.leave_room_usecase().execute(session, room).await?;
        }
        ClientCommand::Post {
            room,
            body,
            message_type,
        } => {
            state
                .post_to_room_usecase()
                .execute(session, room, &body, message_type)
                .await?;
        }
    }
    Ok(())
}

/// Queue an error frame for the originating connection only.
fn report_error(session: &ParticipantSession, error: &ProtocolError) {
    tracing::info!(
        user = %session.identity().id,
        status = error.status_code(),
        reason = error.reason_phrase(),
        "Command rejected"
    );
    let payload = match encode_frame(&render_error_frame(error)) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to encode error frame: {}", e);
            return;
        }
    };
    if let Err(e) = session.connection().try_deliver(&payload) {
        tracing::warn!(conn_id = %session.connection().id(), ?e, "Failed to queue error frame");
    }
}
