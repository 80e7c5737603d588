use actix::{Actor, ActorContext, AsyncContext, Handler, Running, StreamHandler};
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use uuid::Uuid;

use crate::models::{
    AppState, ChessWebSocketMessage, ClientMessage, ErrorBody, GameId, ServerMessage,
};

/// WebSocket handler for chess games
pub struct ChessWebSocket {
    pub id: String,
    pub app_state: web::Data<AppState>,

    /// The game this session receives updates for.
    pub game_id: Option<GameId>,
}

impl ChessWebSocket {
    pub fn new(app_state: web::Data<AppState>) -> ChessWebSocket {
        ChessWebSocket {
            id: Uuid::new_v4().to_string(),
            app_state,
            game_id: None,
        }
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("WebSocket connection started: {}", self.id);
        self.app_state.register_session(self.id.clone(), ctx.address());
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        // Games outlive their sessions; only the subscription goes away.
        if let Some(game_id) = self.game_id.take() {
            self.app_state.unsubscribe(game_id, &self.id);
        }
        self.app_state.remove_session(&self.id);
        info!("WebSocket connection closed: {}", self.id);

        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                info!("Received text message: {}", text);
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => self.handle_message(client_msg, ctx),
                    Err(e) => {
                        warn!("Error parsing client message: {}", e);
                        let error = ErrorBody::new(
                            "invalid_message",
                            format!("Invalid message format: {}", e),
                        );
                        self.send(ctx, &ServerMessage::error(self.game_id, error));
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                let error = ErrorBody::new("invalid_message", "Binary messages are not supported");
                self.send(ctx, &ServerMessage::error(self.game_id, error));
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

impl ChessWebSocket {
    pub fn send(&self, ctx: &mut ws::WebsocketContext<Self>, message: &ServerMessage) {
        match serde_json::to_string(message) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Error serializing message: {}", e),
        }
    }

    pub fn handle_message(&mut self, msg: ClientMessage, ctx: &mut ws::WebsocketContext<Self>) {
        match msg.message_type.as_str() {
            "create" => self.handle_create(ctx),
            "join" => self.handle_join(msg, ctx),
            "move" => self.handle_move(msg, ctx),
            "get_moves" => self.handle_get_moves(msg, ctx),
            other => {
                warn!("Unknown message type: {}", other);
                let error =
                    ErrorBody::new("invalid_message", format!("Unknown message type: {}", other));
                self.send(ctx, &ServerMessage::error(self.game_id, error));
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    info!("New WebSocket connection request");
    ws::start(ChessWebSocket::new(app_state), &req, stream)
}
