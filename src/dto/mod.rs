pub mod account_dto;
pub mod common;
pub mod crew_dto;
pub mod request_dto;
pub mod reminder_dto;
