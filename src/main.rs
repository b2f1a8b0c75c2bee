//! Entry point: load config, wire dependencies, and run the server.

use profiled::auth::TokenService;
use profiled::config::Config;
use profiled::db::{self, MemoryUserStore, PgUserStore, UserStore};
use profiled::{cors_layer, create_app, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY not set, using the development signing secret");
    }

    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::init_schema(&pool).await?;
            tracing::info!("using postgres user store");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory only");
            Arc::new(MemoryUserStore::new())
        }
    };

    let tokens = TokenService::new(&config.secret_key, config.jwt_expiry_minutes);
    let state = AppState::new(store, tokens);

    let app = create_app(state).layer(cors_layer(&config.cors_origins));

    tracing::info!(
        addr = %config.server_addr,
        token_expiry_minutes = config.jwt_expiry_minutes,
        "listening"
    );
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
