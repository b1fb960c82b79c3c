pub mod dispatcher;
pub mod handler;
pub mod publisher;
pub mod storage;
