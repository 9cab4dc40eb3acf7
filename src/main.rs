use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;

use taskvault::auth::AuthMiddleware;
use taskvault::config::Config;
use taskvault::middleware::{RequestLogging, SecurityHeaders};
use taskvault::routes;
use taskvault::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let connect_options = PgConnectOptions::from_str(&config.database_url)
        .expect("DATABASE_URL must be a valid Postgres URL")
        .options([(
            "statement_timeout",
            config.statement_timeout_ms.to_string(),
        )]);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(connect_options)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let state = AppState::postgres(pool, config.auth.clone());
    let cors_origins = config.cors_origins.clone();

    log::info!("starting taskvault server at {}", config.server_url());

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(SecurityHeaders)
            .wrap(RequestLogging)
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
