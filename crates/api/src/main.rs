use kanflow_api::{build_router, state::AppState};
use kanflow_config::Settings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "kanflow_api=debug,kanflow_services=debug,kanflow_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    info!("Starting Kanflow API on {}:{}", settings.app.host, settings.app.port);

    let app_state = if settings.database.is_in_memory() {
        info!("Using in-memory store; data is lost on restart");
        AppState::in_memory(settings.clone())
    } else {
        AppState::with_mongo(settings.clone()).await?
    };

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
