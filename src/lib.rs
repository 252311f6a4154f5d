#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod models;
pub mod query;
pub mod routes;
pub mod schema;
pub mod state;
mod templates;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
