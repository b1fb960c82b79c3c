use kanflow_config::Settings;
use kanflow_db::indexes::ensure_indexes;
use kanflow_services::{
    AuthService, MemoryStore, NotificationDispatcher, NotificationService, NotificationStore,
    OrganizationService, OrganizationStore,
    dao::{NotificationDao, OrganizationDao},
};
use std::sync::Arc;
use tracing::info;

use crate::ws::{publisher::WsPublisher, storage::WsStorage};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub notifications: Arc<NotificationService>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub organizations: Arc<OrganizationService>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(
        notification_store: Arc<dyn NotificationStore>,
        organization_store: Arc<dyn OrganizationStore>,
        settings: Settings,
    ) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let ws_storage = Arc::new(WsStorage::new());
        let publisher = Arc::new(WsPublisher::new(ws_storage.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            notification_store.clone(),
            publisher,
        ));
        let notifications = Arc::new(NotificationService::new(
            notification_store,
            settings.notifications.clone(),
        ));
        let organizations = Arc::new(OrganizationService::new(organization_store));

        Self {
            settings,
            auth,
            notifications,
            dispatcher,
            organizations,
            ws_storage,
        }
    }

    /// Everything lives in process memory; used by tests and `memory://`.
    pub fn in_memory(settings: Settings) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, settings)
    }

    pub async fn with_mongo(settings: Settings) -> anyhow::Result<Self> {
        let db = kanflow_db::connect(&settings.database).await?;
        ensure_indexes(&db).await?;
        info!(database = %settings.database.name, "MongoDB store ready");

        Ok(Self::new(
            Arc::new(NotificationDao::new(&db)),
            Arc::new(OrganizationDao::new(&db)),
            settings,
        ))
    }
}
