use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// `mongodb://...` for the real store, `memory://` for the in-process one.
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

impl DatabaseSettings {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    pub default_list_limit: u32,
    pub max_list_limit: u32,
}

impl NotificationSettings {
    /// Clamps a caller-supplied page size into `[1, max_list_limit]`.
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_list_limit)
            .clamp(1, self.max_list_limit.max(1))
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            default_list_limit: 20,
            max_list_limit: 100,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("KANFLOW"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "kanflow")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.issuer", "kanflow")?
            .set_default("notifications.default_list_limit", 20)?
            .set_default("notifications.max_list_limit", 100)?
            .build()?;

        config.try_deserialize()
    }
}
