pub mod admin_service;
pub mod client_service;
pub mod crew_service;
pub mod export_service;
pub mod file_store;
pub mod identity_service;
pub mod notification_service;
pub mod reminder_service;
pub mod request_service;
