//! Request handlers.

pub mod auth;
pub mod directory;
pub mod health;
pub mod resources;
