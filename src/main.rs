use actix_web::{middleware, web, App, HttpServer};
use trivia_core::{configure, prepare_database, AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(std::io::Error::other)?;
    let pool = prepare_database(&config).map_err(|e| {
        log::error!("{}", e);
        std::io::Error::other(e)
    })?;
    let state = web::Data::new(AppState::new(pool));

    log::info!("Starting trivia server on {}", config.bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind(&config.bind_addr)?.run().await
}
