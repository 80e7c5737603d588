use actix_web_actors::ws;
use log::{info, warn};

use crate::error::GameError;
use crate::models::{ClientMessage, ErrorBody, GameId, ServerMessage};
use crate::routes::parse_game_id;
use crate::websocket::handler::ChessWebSocket;

impl ChessWebSocket {
    fn subscribe(&mut self, game_id: GameId) {
        if let Some(previous) = self.game_id.replace(game_id) {
            if previous != game_id {
                self.app_state.unsubscribe(previous, &self.id);
            }
        }
        self.app_state.subscribe(game_id, &self.id);
    }

    /// The game named in the message, or the one this session follows.
    fn target_game(&self, msg: &ClientMessage) -> Result<GameId, ErrorBody> {
        match (&msg.game_id, self.game_id) {
            (Some(raw), _) => parse_game_id(raw).map_err(|e| ErrorBody::from(&e)),
            (None, Some(current)) => Ok(current),
            (None, None) => Err(ErrorBody::new("bad_request", "Not in a game")),
        }
    }

    fn send_game_error(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        game_id: Option<GameId>,
        error: &GameError,
    ) {
        warn!("Rejected request for game {:?}: {}", game_id, error);
        self.send(ctx, &ServerMessage::error(game_id, ErrorBody::from(error)));
    }

    pub fn handle_create(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let game = self.app_state.registry.create();
        info!("Session {} created game {}", self.id, game.id());
        self.subscribe(game.id());
        self.send(ctx, &ServerMessage::with_game("game_created", game));
    }

    pub fn handle_join(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let game_id = match self.target_game(&msg) {
            Ok(id) => id,
            Err(error) => return self.send(ctx, &ServerMessage::error(None, error)),
        };

        match self.app_state.registry.get(game_id) {
            Ok(game) => {
                info!("Session {} joined game {}", self.id, game_id);
                self.subscribe(game_id);
                self.send(ctx, &ServerMessage::with_game("joined", game));
            }
            Err(e) => self.send_game_error(ctx, Some(game_id), &e),
        }
    }

    pub fn handle_move(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let game_id = match self.target_game(&msg) {
            Ok(id) => id,
            Err(error) => return self.send(ctx, &ServerMessage::error(None, error)),
        };

        let squares = msg
            .source()
            .and_then(|from| msg.destination().map(|to| (from, to)));
        let (from, to) = match squares {
            Ok((Some(from), Some(to))) => (from, to),
            Ok(_) => {
                let error = ErrorBody::new("bad_request", "Move requires from and to positions");
                return self.send(ctx, &ServerMessage::error(Some(game_id), error));
            }
            Err(e) => return self.send_game_error(ctx, Some(game_id), &e),
        };

        match self.app_state.registry.attempt_move(game_id, from, to, msg.promote_to) {
            Ok(game) => {
                let message = ServerMessage::with_game("move_made", game);
                // A session already following another game keeps following it.
                if self.game_id.is_none() {
                    self.subscribe(game_id);
                }
                if self.game_id != Some(game_id) {
                    self.send(ctx, &message);
                }
                self.app_state.broadcast_to_game(game_id, &message);
            }
            Err(e) => self.send_game_error(ctx, Some(game_id), &e),
        }
    }

    pub fn handle_get_moves(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        let game_id = match self.target_game(&msg) {
            Ok(id) => id,
            Err(error) => return self.send(ctx, &ServerMessage::error(None, error)),
        };

        let from = match msg.source() {
            Ok(Some(from)) => from,
            Ok(None) => {
                let error = ErrorBody::new("bad_request", "Get moves requires from position");
                return self.send(ctx, &ServerMessage::error(Some(game_id), error));
            }
            Err(e) => return self.send_game_error(ctx, Some(game_id), &e),
        };

        match self.app_state.registry.legal_moves(game_id, from) {
            Ok(moves) => {
                let moves = moves.into_iter().collect();
                self.send(ctx, &ServerMessage::available_moves(game_id, moves));
            }
            Err(e) => self.send_game_error(ctx, Some(game_id), &e),
        }
    }
}
