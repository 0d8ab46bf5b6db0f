pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod logging;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod tasks;
pub mod test_helpers;
