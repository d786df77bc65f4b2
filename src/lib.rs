pub mod agent;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod mailer;
pub mod models;
pub mod report;
pub mod server;
pub mod utils;

#[cfg(test)]
mod testing;

pub use agent::Agent;
pub use config::Config;
pub use models::*;
