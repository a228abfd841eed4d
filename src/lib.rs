pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod observability;
pub mod state;
pub mod store;
pub mod watcher;
