use std::io;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use crate::handlers;
use crate::state::AppState;

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(handlers::health::config)
        .configure(handlers::chat::config)
        .configure(handlers::upload::config)
        .configure(handlers::recommend::config);
}

pub async fn run_server(state: AppState, host: &str, port: u16) -> io::Result<()> {
    let state = web::Data::new(state);

    log::info!("Starting advisor server on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind((host, port))?
    .run()
    .await
}
