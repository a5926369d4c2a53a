pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod poll;
pub mod routes;
pub mod services;
pub mod state;
pub mod templates;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::create_routes;
pub use state::AppState;
