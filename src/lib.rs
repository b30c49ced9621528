pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod oracle;
pub mod providers;
pub mod render;
pub mod search;
pub mod state;
pub mod store;
pub mod utils;
