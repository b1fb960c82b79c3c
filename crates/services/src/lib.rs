pub mod auth;
pub mod dao;
pub mod notification;
pub mod organization;
pub mod store;

pub use auth::AuthService;
pub use dao::*;
pub use notification::{NotificationDispatcher, NotificationService};
pub use organization::OrganizationService;
pub use store::{MemoryStore, NotificationStore, OrganizationStore};
