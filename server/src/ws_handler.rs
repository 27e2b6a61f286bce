use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use lobby_common::{log, log_error, ClientMessage, ConnectionId, PlayerName, ServerMessage};

use crate::connection_tracker::ConnectionSlot;
use crate::web_server::WebServerState;

pub async fn handle_websocket(socket: WebSocket, state: WebServerState, slot: ConnectionSlot) {
    let id = slot.id();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(128);

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let payload = match message.encode() {
                Ok(payload) => payload,
                Err(e) => {
                    log_error!("[{}] {}", id, e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    state.broadcaster.register(id, tx).await;
    log!("[{}] New client connected ({} open)", id, state.tracker.count());

    while let Some(result) = ws_receiver.next().await {
        let text = match result {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    log!("[{}] Ignoring non UTF-8 binary frame", id);
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                log!("[{}] Read error: {}", id, e);
                break;
            }
        };

        match ClientMessage::decode(&text) {
            Ok(message) => handle_client_message(&state, id, message).await,
            Err(e) => log!("[{}] Dropping frame: {}", id, e),
        }
    }

    log!("[{}] Connection closed", id);
    state.broadcaster.unregister(id).await;
    if state.lobby_manager.leave(id).await {
        broadcast_roster(&state).await;
    }
    send_task.abort();
}

async fn handle_client_message(state: &WebServerState, id: ConnectionId, message: ClientMessage) {
    match message {
        ClientMessage::PlayerJoined { player_name } => {
            let Some(name) = PlayerName::parse(&player_name) else {
                log!("[{}] Ignoring join with a blank name", id);
                return;
            };
            let shown = name.to_string();
            match state.lobby_manager.join(id, name).await {
                Some(previous) => log!("[{}] Player renamed: {} -> {}", id, previous, shown),
                None => log!("[{}] Player joined: {}", id, shown),
            }
            broadcast_roster(state).await;
        }
        ClientMessage::Timer { level } => {
            log!("[{}] Timer level {}", id, level);
            if broadcast_to_lobby(state, &ServerMessage::Timer { level }).await {
                broadcast_roster(state).await;
            }
        }
        ClientMessage::TimerEnd => {
            log!("[{}] Countdown finished", id);
        }
    }
}

/// Sends `usersUpdate` to every player. Players that cannot be reached are
/// dropped from the lobby and the rest get a fresh roster.
///
/// Roster broadcasts are serialized and each one reads the roster while
/// holding the lock, so no player sees an older roster after a newer one.
pub async fn broadcast_roster(state: &WebServerState) {
    let _roster_guard = state.roster_lock.lock().await;
    loop {
        let roster = ServerMessage::UsersUpdate {
            users: state.lobby_manager.roster().await,
        };
        if !broadcast_to_lobby(state, &roster).await {
            break;
        }
    }
}

/// Returns `true` if unreachable players were removed.
async fn broadcast_to_lobby(state: &WebServerState, message: &ServerMessage) -> bool {
    let members = state.lobby_manager.members().await;
    let failed = state.broadcaster.broadcast_to(&members, message).await;

    let mut removed = false;
    for id in failed {
        state.broadcaster.unregister(id).await;
        removed |= state.lobby_manager.leave(id).await;
    }
    removed
}
