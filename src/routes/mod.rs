use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use log::{error, warn};
use std::fmt::{Debug, Display};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::GameError;
use crate::game::position::Position;
use crate::models::{
    AppState, ErrorBody, GameId, MoveQuery, MovesResponse, ServerMessage, VersionResponse,
};

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::InvalidCoordinate { .. }
            | GameError::InvalidNotation(_)
            | GameError::InvalidGameId(_) => StatusCode::BAD_REQUEST,
            GameError::GameNotFound(_) => StatusCode::NOT_FOUND,
            GameError::NotYourTurn { .. } | GameError::GameAlreadyTerminal(_) => {
                StatusCode::CONFLICT
            }
            GameError::NoPieceAtSource(_) | GameError::IllegalMove { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GameError::KingMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            error!("{}", self);
        } else {
            warn!("Rejected request: {}", self);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody::from(self))
    }
}

pub fn parse_game_id(raw: &str) -> Result<GameId, GameError> {
    Uuid::from_str(raw.trim()).map_err(|_| GameError::InvalidGameId(raw.to_string()))
}

/// Accepts a `[rank, file]` JSON tuple or algebraic notation such as `E2`.
pub fn parse_position(raw: &str) -> Result<Position, GameError> {
    let raw = raw.trim();
    if raw.starts_with('[') {
        let (rank, file) = serde_json::from_str::<(i64, i64)>(raw)
            .map_err(|_| GameError::InvalidNotation(raw.to_string()))?;
        Position::new(rank, file)
    } else {
        Position::from_str(raw)
    }
}

/// HTTP handler for the static details endpoint
pub async fn details() -> HttpResponse {
    HttpResponse::Ok().json(VersionResponse {
        name: NAME,
        version: VERSION,
    })
}

pub async fn list_games(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.registry.list())
}

pub async fn create_game(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(data.registry.create())
}

pub async fn get_game(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GameError> {
    let id = parse_game_id(&path)?;
    Ok(HttpResponse::Ok().json(data.registry.get(id)?))
}

pub async fn delete_game(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GameError> {
    let id = parse_game_id(&path)?;
    data.registry.delete(id)?;
    data.forget_game(id);
    Ok(HttpResponse::Ok().finish())
}

pub async fn get_moves(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, GameError> {
    let (game_id, raw_position) = path.into_inner();
    let id = parse_game_id(&game_id)?;
    let from = parse_position(&raw_position)?;

    let moves = data.registry.legal_moves(id, from)?;
    Ok(HttpResponse::Ok().json(MovesResponse {
        from,
        moves: moves.into_iter().collect(),
    }))
}

pub async fn post_move(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<MoveQuery>,
    new_position: web::Json<(i64, i64)>,
) -> Result<HttpResponse, GameError> {
    let (game_id, raw_position) = path.into_inner();
    let id = parse_game_id(&game_id)?;
    let from = parse_position(&raw_position)?;
    let to = Position::try_from(new_position.into_inner())?;

    let game = data.registry.attempt_move(id, from, to, query.promotion)?;
    data.broadcast_to_game(id, &ServerMessage::with_game("move_made", game.clone()));
    Ok(HttpResponse::Ok().json(game))
}

/// Body and query extraction failures, answered with the usual error body.
fn extractor_error<E>(kind: &str, err: E) -> actix_web::Error
where
    E: Debug + Display + 'static,
{
    warn!("Rejected request: {}", err);
    let body = ErrorBody::new(kind, err.to_string());
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _| extractor_error("invalid_body", err)),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _| extractor_error("invalid_query", err)),
    )
    .service(web::resource("/details").route(web::get().to(details)))
    .service(web::resource("/version").route(web::get().to(details)))
    .service(web::resource("/games").route(web::get().to(list_games)))
    .service(web::resource("/game").route(web::put().to(create_game)))
    .service(
        web::resource("/game/{id}")
            .route(web::get().to(get_game))
            .route(web::delete().to(delete_game)),
    )
    .service(web::resource("/game/{id}/{position}/moves").route(web::get().to(get_moves)))
    .service(web::resource("/game/{id}/{position}/move").route(web::post().to(post_move)))
    .service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)));
}
