use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use lobby_common::{log, ConnectionId, ServerMessage};

pub type ClientSender = mpsc::Sender<ServerMessage>;

/// Outbound queues of every open connection.
#[derive(Clone, Default)]
pub struct Broadcaster {
    clients: Arc<Mutex<HashMap<ConnectionId, ClientSender>>>,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").finish()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, id: ConnectionId, sender: ClientSender) {
        self.clients.lock().await.insert(id, sender);
    }

    pub async fn unregister(&self, id: ConnectionId) {
        self.clients.lock().await.remove(&id);
    }

    /// Sends to every listed connection and returns the ones that could not
    /// take the message, either unknown or with their writer gone.
    pub async fn broadcast_to(&self, ids: &[ConnectionId], message: &ServerMessage) -> Vec<ConnectionId> {
        let clients = self.clients.lock().await;
        let mut failed = Vec::new();
        for id in ids {
            match clients.get(id) {
                Some(sender) => {
                    if let Err(e) = sender.send(message.clone()).await {
                        log!("[{}] Failed to send: {}", id, e);
                        failed.push(*id);
                    }
                }
                None => failed.push(*id),
            }
        }
        failed
    }
}
