use blog_router::{
    AppState,
    config::{AppConfig, Env},
    create_app,
    repository::{PostgresRepository, RepositoryState},
    routes,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database, route table, then the HTTP
/// server. Any startup failure aborts the process.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging, RUST_LOG first, then defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "blog_router=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    if config.ephemeral_secret {
        tracing::warn!("JWT_SECRET not set; using a per-process secret, credentials will not survive a restart");
    }

    // 3. Database
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let postgres = PostgresRepository::new(pool);
    postgres
        .ensure_schema()
        .await
        .expect("FATAL: Failed to prepare the database schema.");
    let repo = Arc::new(postgres) as RepositoryState;

    // 4. Route table, built once and shared read-only from here on.
    let routes = routes::blog_routes().expect("FATAL: invalid route table");
    tracing::info!(routes = routes.len(), "route table built");

    // 5. Server
    let bind_addr = config.bind_addr;
    let app = create_app(routes, AppState::new(repo, config));

    let listener = TcpListener::bind(bind_addr)
        .await
        .expect("FATAL: Failed to bind the listener.");

    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("FATAL: server terminated unexpectedly");
}
