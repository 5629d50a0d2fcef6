pub mod notification_service;
pub mod user_service;
