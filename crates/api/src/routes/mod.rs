pub mod event;
pub mod invite;
pub mod member;
pub mod notification;
pub mod organization;
