pub mod auth;
pub mod health;
pub mod measurements;
pub mod sensors;
pub mod series;
