pub mod invitation;
pub mod notification;
pub mod notification_preference;
pub mod organization;
pub mod organization_member;

pub use invitation::*;
pub use notification::*;
pub use notification_preference::*;
pub use organization::*;
pub use organization_member::*;
