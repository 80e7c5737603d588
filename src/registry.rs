use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use uuid::Uuid;

use crate::error::GameError;
use crate::game::piece::PromotionChoice;
use crate::game::position::Position;
use crate::models::game_state::{Game, GameId};

type GameHandle = Arc<Mutex<Game>>;

/// Owns every active game. Callers get snapshots, never references into the map.
///
/// The id map sits behind a `RwLock`; each game has its own `Mutex`, so moves
/// on one game are serialized while different games proceed in parallel.
#[derive(Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, GameHandle>>,
}

fn lock(game: &Mutex<Game>) -> MutexGuard<'_, Game> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}

impl GameRegistry {
    pub fn new() -> GameRegistry {
        GameRegistry::default()
    }

    /// Create and return a new game from the standard starting position.
    pub fn create(&self) -> Game {
        let mut games = self.games.write().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let candidate = Uuid::new_v4();
            if !games.contains_key(&candidate) {
                break candidate;
            }
        };

        let game = Game::new(id);
        games.insert(id, Arc::new(Mutex::new(game.clone())));
        info!("Created game {} ({} active)", id, games.len());
        game
    }

    fn handle(&self, id: GameId) -> Result<GameHandle, GameError> {
        self.games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(GameError::GameNotFound(id))
    }

    pub fn get(&self, id: GameId) -> Result<Game, GameError> {
        let handle = self.handle(id)?;
        let game = lock(&handle).clone();
        Ok(game)
    }

    /// Snapshots of all games, oldest first.
    pub fn list(&self) -> Vec<Game> {
        let handles: Vec<GameHandle> = self
            .games
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut games: Vec<Game> = handles.iter().map(|handle| lock(handle).clone()).collect();
        games.sort_by_key(|game| (game.created_at(), game.id()));
        games
    }

    pub fn delete(&self, id: GameId) -> Result<(), GameError> {
        let removed = self
            .games
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(_) => {
                info!("Deleted game {}", id);
                Ok(())
            }
            None => Err(GameError::GameNotFound(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies a move to the game and returns the updated snapshot.
    pub fn attempt_move(
        &self,
        id: GameId,
        from: Position,
        to: Position,
        promotion: Option<PromotionChoice>,
    ) -> Result<Game, GameError> {
        let handle = self.handle(id)?;
        let mut game = lock(&handle);
        match game.attempt_move(from, to, promotion) {
            Ok(record) => {
                debug!("Game {} accepted {} -> {}", id, record.from, record.to);
                Ok(game.clone())
            }
            Err(e) => {
                if e.is_internal() {
                    warn!("Game {} hit an engine defect: {}", id, e);
                }
                Err(e)
            }
        }
    }

    pub fn legal_moves(&self, id: GameId, from: Position) -> Result<BTreeSet<Position>, GameError> {
        let handle = self.handle(id)?;
        let moves = lock(&handle).legal_moves(from);
        Ok(moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::piece::Color;
    use std::thread;

    fn sq(name: &str) -> Position {
        name.parse().unwrap()
    }

    #[test]
    fn create_then_get() {
        let registry = GameRegistry::new();
        let game = registry.create();
        assert_eq!(registry.get(game.id()).unwrap(), game);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = GameRegistry::new();
        let id = Uuid::new_v4();
        assert_eq!(registry.get(id), Err(GameError::GameNotFound(id)));
        assert_eq!(registry.delete(id), Err(GameError::GameNotFound(id)));
        assert!(matches!(
            registry.attempt_move(id, sq("E2"), sq("E4"), None),
            Err(GameError::GameNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_the_game() {
        let registry = GameRegistry::new();
        let game = registry.create();
        registry.delete(game.id()).unwrap();
        assert!(registry.is_empty());
        assert!(registry.get(game.id()).is_err());
    }

    #[test]
    fn moves_are_visible_in_later_snapshots() {
        let registry = GameRegistry::new();
        let id = registry.create().id();
        let updated = registry.attempt_move(id, sq("G1"), sq("F3"), None).unwrap();
        assert_eq!(updated.moves_count(), 1);
        assert_eq!(registry.get(id).unwrap(), updated);
        assert_eq!(registry.legal_moves(id, sq("G8")).unwrap().len(), 2);
    }

    #[test]
    fn snapshots_do_not_alias_the_stored_game() {
        let registry = GameRegistry::new();
        let snapshot = registry.create();
        registry.attempt_move(snapshot.id(), sq("E2"), sq("E4"), None).unwrap();
        assert_eq!(snapshot.moves_count(), 0);
        assert!(snapshot.board().get(sq("E2")).is_some());
    }

    #[test]
    fn concurrent_creation_yields_distinct_ids() {
        let registry = Arc::new(GameRegistry::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || (0..25).map(|_| registry.create().id()).collect::<Vec<_>>())
            })
            .collect();

        let ids: BTreeSet<GameId> = workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap())
            .collect();
        assert_eq!(ids.len(), 200);
        assert_eq!(registry.len(), 200);
        assert_eq!(registry.list().len(), 200);
    }

    #[test]
    fn racing_moves_on_one_game_apply_once() {
        let registry = Arc::new(GameRegistry::new());
        let id = registry.create().id();

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.attempt_move(id, sq("E2"), sq("E4"), None).is_ok())
            })
            .collect();
        let accepted = workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .filter(|accepted| *accepted)
            .count();
        assert_eq!(accepted, 1);

        let game = registry.get(id).unwrap();
        assert_eq!(game.moves_count(), 1);
        assert_eq!(game.current_move(), Color::Black);
    }
}
