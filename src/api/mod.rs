pub mod completion_api;
pub mod football_api;

use crate::models::Fixture;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Source of fixtures and the per-fixture data fed to the analyzer
#[async_trait]
pub trait FootballData: Send + Sync {
    async fn get_today_fixtures(&self) -> Result<Vec<Fixture>>;
    async fn get_predictions(&self, fixture_id: i64) -> Result<Vec<Value>>;
    async fn get_odds(&self, fixture_id: i64) -> Result<Vec<Value>>;
}

/// A chat-completion model answering a single user message
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
