//! Authoritative chess game server: rules engine, game registry and the
//! HTTP/WebSocket layer that exposes them.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod registry;
pub mod routes;
pub mod websocket;

pub use error::GameError;
pub use models::{Game, GameId, GameStatus};
pub use registry::GameRegistry;
