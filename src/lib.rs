pub mod auth;
pub mod database;
pub mod errors;
pub mod selection;
pub mod server;
pub mod services;
