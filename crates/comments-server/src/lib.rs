pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod routes;

pub use config::Config;
pub use routes::{create_router, AppState};
