use actix_files as fs;
use actix_web::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use actix_web::http::Method;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use log::info;
use std::io;

use chess_game_server::config::ServerConfig;
use chess_game_server::models::AppState;
use chess_game_server::routes::configure_routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config =
        ServerConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let (host, port) = config.address();
    info!("Starting chess game server at http://{}:{}", host, port);

    // Create shared application state
    let app_state = web::Data::new(AppState::new());
    let static_dir = config.static_dir.clone();
    if let Some(dir) = &static_dir {
        info!("Serving static files from {}", dir.display());
    }

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
                    .add((ACCESS_CONTROL_ALLOW_METHODS, "*"))
                    .add((ACCESS_CONTROL_ALLOW_HEADERS, "*")),
            )
            .configure(configure_routes);

        if let Some(dir) = &static_dir {
            app = app.service(fs::Files::new("/static", dir).index_file("index.html"));
        }

        app.default_service(web::route().method(Method::OPTIONS).to(HttpResponse::Ok))
    })
    .bind(config.address())?
    .run()
    .await
}
