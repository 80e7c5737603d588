use actix::Addr;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{ChessWebSocketMessage, GameId, ServerMessage};
use crate::registry::GameRegistry;
use crate::websocket::ChessWebSocket;

/// Application state shared between connections
#[derive(Default)]
pub struct AppState {
    pub registry: GameRegistry,

    /// WebSocket session ids subscribed to each game.
    connections: Mutex<HashMap<GameId, Vec<String>>>,
    sessions: Mutex<HashMap<String, Addr<ChessWebSocket>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppState {
    pub fn new() -> AppState {
        AppState::default()
    }

    pub fn register_session(&self, session_id: String, addr: Addr<ChessWebSocket>) {
        let mut sessions = lock(&self.sessions);
        sessions.insert(session_id, addr);
        info!("Total active sessions: {}", sessions.len());
    }

    pub fn remove_session(&self, session_id: &str) {
        let mut sessions = lock(&self.sessions);
        sessions.remove(session_id);
        info!("Total active sessions: {}", sessions.len());
    }

    pub fn subscribe(&self, game_id: GameId, session_id: &str) {
        let mut connections = lock(&self.connections);
        let subscribers = connections.entry(game_id).or_default();
        if !subscribers.iter().any(|id| id == session_id) {
            subscribers.push(session_id.to_string());
        }
    }

    pub fn unsubscribe(&self, game_id: GameId, session_id: &str) {
        let mut connections = lock(&self.connections);
        if let Some(subscribers) = connections.get_mut(&game_id) {
            subscribers.retain(|id| id != session_id);
            info!("Removed session {} from game {}'s connections", session_id, game_id);
            if subscribers.is_empty() {
                connections.remove(&game_id);
            }
        }
    }

    pub fn subscriber_count(&self, game_id: GameId) -> usize {
        lock(&self.connections).get(&game_id).map_or(0, Vec::len)
    }

    /// Drops subscriptions of a deleted game.
    pub fn forget_game(&self, game_id: GameId) {
        lock(&self.connections).remove(&game_id);
    }

    pub fn broadcast_to_game(&self, game_id: GameId, message: &ServerMessage) {
        // Copy what we need so no lock is held while sending.
        let connection_ids = match lock(&self.connections).get(&game_id) {
            Some(ids) => ids.clone(),
            None => return,
        };
        let recipients: Vec<Addr<ChessWebSocket>> = {
            let sessions = lock(&self.sessions);
            connection_ids
                .iter()
                .filter_map(|id| sessions.get(id).cloned())
                .collect()
        };

        let message_str = match serde_json::to_string(message) {
            Ok(s) => s,
            Err(e) => {
                warn!("Error serializing message: {}", e);
                return;
            }
        };

        info!(
            "Broadcasting {} to {} sessions of game {}",
            message.message_type,
            recipients.len(),
            game_id
        );
        for addr in recipients {
            addr.do_send(ChessWebSocketMessage(message_str.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn subscriptions_are_deduplicated_and_pruned() {
        let state = AppState::new();
        let game_id = Uuid::new_v4();

        state.subscribe(game_id, "a");
        state.subscribe(game_id, "a");
        state.subscribe(game_id, "b");
        assert_eq!(state.subscriber_count(game_id), 2);

        state.unsubscribe(game_id, "a");
        state.unsubscribe(game_id, "b");
        assert_eq!(state.subscriber_count(game_id), 0);
    }

    #[test]
    fn broadcast_without_subscribers_is_a_no_op() {
        let state = AppState::new();
        let game = state.registry.create();
        state.broadcast_to_game(game.id(), &ServerMessage::with_game("move_made", game));
        state.forget_game(Uuid::new_v4());
    }
}
