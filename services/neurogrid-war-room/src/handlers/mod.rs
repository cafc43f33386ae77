pub mod chat;
pub mod desk;
pub mod health;
