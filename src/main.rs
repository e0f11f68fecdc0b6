use anyhow::Context;
use f1_pronos::{
    config::Config,
    create_router, db,
    notify::WebhookNotifier,
    provider::JolpicaProvider,
    scheduler::{self, SchedulerConfig},
    wizard, AppState, Repositories,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const WIZARD_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "f1_pronos=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(season = config.season, "Starting F1 predictions server");

    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool)
        .await
        .context("failed to apply database schema")?;

    let provider = Arc::new(
        JolpicaProvider::new(&config.provider_base_url)
            .context("failed to build results provider client")?,
    );
    let notifier = Arc::new(WebhookNotifier::new(
        reqwest::Client::new(),
        config.announce_webhook_urls.clone(),
    ));

    let app_state = AppState::new(&config, Repositories::sqlite(pool), provider, notifier);

    match app_state.race_service.sync_calendar().await {
        Ok(count) => info!(count, "Season calendar synced"),
        Err(e) => warn!(error = %e, "Initial calendar sync failed, continuing with stored data"),
    }

    scheduler::spawn_all(&app_state, SchedulerConfig::from(&config));
    tokio::spawn(wizard::start_cleanup_task(
        Arc::clone(&app_state.wizard_service),
        WIZARD_SWEEP_INTERVAL,
    ));

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("Server running on http://{}", config.bind_address);
    axum::serve(listener, app).await?;

    Ok(())
}
