pub mod app_state;
pub mod cursors;
pub mod focus;
pub mod library;
pub mod popup;
pub mod request_log;
pub mod response;
pub mod shared;
