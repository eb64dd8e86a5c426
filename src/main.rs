use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocab_quiz::{config::AppConfig, db, handlers, state::AppState};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vocab_quiz=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  if config.gemini_api_key.is_none() {
    tracing::warn!(
      "No AI API key configured (set GOOGLE_API_KEY); definitions come from the cache only and answers need manual marking"
    );
  }

  let state = AppState::new(pool, &config);
  let app = handlers::router(state);

  let listener = tokio::net::TcpListener::bind(&config.bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", config.bind_addr));

  tracing::info!("Server running on http://{}", config.bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
