pub mod dispatcher;
pub mod preferences;
pub mod publisher;
pub mod service;

pub use dispatcher::{Dispatch, NotificationDispatcher, NotificationError, NotificationEvent};
pub use preferences::PreferencesUpdate;
pub use publisher::{NotificationPayload, NotificationPublisher, PublishError, RealtimeEvent};
pub use service::NotificationService;
