pub mod chat;
pub mod health;
pub mod recommend;
pub mod upload;
