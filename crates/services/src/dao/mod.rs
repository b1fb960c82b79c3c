pub mod base;
pub mod notification;
pub mod organization;

pub use base::{BaseDao, DaoError, DaoResult};
pub use notification::NotificationDao;
pub use organization::OrganizationDao;
