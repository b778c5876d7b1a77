pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use app::{app, AppState};
pub use config::AppConfig;
pub use error::ApiError;
