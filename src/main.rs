use std::sync::Arc;

use cable_market::config::{init_db, Config};
use cable_market::services::notify::{LogNotifier, Notifier, SendgridNotifier};
use cable_market::{create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cable_market=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let db = init_db(&config.database_url).await?;
    tracing::info!("Connected to MySQL, migrations applied");

    let notifier: Arc<dyn Notifier> = match &config.sendgrid_api_key {
        Some(key) => {
            tracing::info!("Email delivery via SendGrid");
            Arc::new(SendgridNotifier::new(
                key.clone(),
                config.from_email.clone(),
                config.from_name.clone(),
            ))
        }
        None => {
            tracing::warn!("SENDGRID_API_KEY not set, notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    tokio::fs::create_dir_all(&config.media_root).await?;
    let state = Arc::new(AppState::new(db, &config, notifier)?);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
