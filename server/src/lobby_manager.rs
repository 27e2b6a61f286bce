use std::sync::Arc;
use tokio::sync::Mutex;

use lobby_common::{ConnectionId, PlayerName};

/// Named connections in the order they first joined.
#[derive(Debug, Clone, Default)]
pub struct LobbyManager {
    players: Arc<Mutex<Vec<(ConnectionId, PlayerName)>>>,
}

impl LobbyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names `id`, or renames it while keeping its place.
    /// Returns the previous name on a rename.
    pub async fn join(&self, id: ConnectionId, name: PlayerName) -> Option<PlayerName> {
        let mut players = self.players.lock().await;
        match players.iter_mut().find(|(player_id, _)| *player_id == id) {
            Some((_, existing)) => Some(std::mem::replace(existing, name)),
            None => {
                players.push((id, name));
                None
            }
        }
    }

    /// `true` if `id` had joined.
    pub async fn leave(&self, id: ConnectionId) -> bool {
        let mut players = self.players.lock().await;
        let before = players.len();
        players.retain(|(player_id, _)| *player_id != id);
        players.len() != before
    }

    pub async fn roster(&self) -> Vec<String> {
        roster_of(&self.players.lock().await)
    }

    pub async fn members(&self) -> Vec<ConnectionId> {
        self.players.lock().await.iter().map(|(id, _)| *id).collect()
    }
}

fn roster_of(players: &[(ConnectionId, PlayerName)]) -> Vec<String> {
    players.iter().map(|(_, name)| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> PlayerName {
        PlayerName::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_roster_keeps_join_order() {
        let lobby = LobbyManager::new();
        assert_eq!(lobby.join(ConnectionId::new(2), name("Bob")).await, None);
        assert_eq!(lobby.join(ConnectionId::new(1), name("Alice")).await, None);

        assert_eq!(lobby.roster().await, vec!["Bob", "Alice"]);
        assert_eq!(lobby.members().await, vec![ConnectionId::new(2), ConnectionId::new(1)]);
    }

    #[tokio::test]
    async fn test_rejoin_renames_in_place() {
        let lobby = LobbyManager::new();
        lobby.join(ConnectionId::new(1), name("A")).await;
        lobby.join(ConnectionId::new(2), name("B")).await;

        let previous = lobby.join(ConnectionId::new(1), name("A2")).await;

        assert_eq!(previous, Some(name("A")));
        assert_eq!(lobby.roster().await, vec!["A2", "B"]);
    }

    #[tokio::test]
    async fn test_leave_removes_only_that_connection() {
        let lobby = LobbyManager::new();
        lobby.join(ConnectionId::new(1), name("A")).await;
        lobby.join(ConnectionId::new(2), name("B")).await;

        assert!(lobby.leave(ConnectionId::new(1)).await);
        assert!(!lobby.leave(ConnectionId::new(1)).await);
        assert!(!lobby.leave(ConnectionId::new(9)).await);
        assert_eq!(lobby.roster().await, vec!["B"]);
    }
}
