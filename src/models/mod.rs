pub mod chat;
pub mod medication;
pub mod mood;
pub mod reminder;
pub mod status;
pub mod user;
