use kanflow_api::{build_router, state::AppState};
use kanflow_config::{AppSettings, DatabaseSettings, JwtSettings, NotificationSettings, Settings};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A running test application, backed by the in-memory store unless spawned
/// with [`TestApp::spawn_mongo`].
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub settings: Settings,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn a server on a random local port. No database is required.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// The `mutator` closure receives the default test settings and may tweak
    /// them before the server starts.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = test_settings();
        mutator(&mut settings);

        let state = AppState::in_memory(settings.clone());
        Self::serve(settings, state).await
    }

    /// Spawn a server on the Mongo DAOs with its own database.
    ///
    /// Requires a running MongoDB at localhost:27017.
    /// Set KANFLOW__DATABASE__URL to override the connection string.
    /// Each test gets a unique database name for isolation.
    pub async fn spawn_mongo() -> Self {
        let mut settings = test_settings();
        settings.database.url = std::env::var("KANFLOW__DATABASE__URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        settings.database.name = format!("kanflow_test_{}", uuid::Uuid::new_v4().simple());

        let state = AppState::with_mongo(settings.clone())
            .await
            .expect("Failed to connect to the test MongoDB");
        Self::serve(settings, state).await
    }

    async fn serve(settings: Settings, state: AppState) -> Self {
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            settings,
            state,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }
}

fn test_settings() -> Settings {
    Settings {
        app: AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        },
        database: DatabaseSettings {
            url: "memory://".to_string(),
            name: "kanflow_test".to_string(),
            max_pool_size: None,
            min_pool_size: None,
        },
        jwt: JwtSettings {
            secret: "test-secret-key-for-jwt-signing-minimum-32-chars".to_string(),
            access_token_ttl_secs: 3600,
            issuer: "kanflow".to_string(),
        },
        notifications: NotificationSettings::default(),
    }
}
