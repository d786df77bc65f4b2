//! In-process fakes for the external services, shared by the unit tests.

use crate::analyzer::Analyzer;
use crate::api::{ChatCompletion, FootballData};
use crate::config::Config;
use crate::mailer::ReportMailer;
use crate::models::{Fixture, Language};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Configuration whose provider and completion URLs both point at `base_url`, with no retry delay
pub fn test_config(base_url: &str) -> Config {
    let env = HashMap::from([
        ("API_FOOTBALL_KEY", "test-key"),
        ("API_FOOTBALL_HOST", "v3.football.api-sports.io"),
        ("API_FOOTBALL_BASE_URL", base_url),
        ("OPENAI_API_KEY", "sk-test"),
        ("OPENAI_BASE_URL", base_url),
        ("SMTP_EMAIL", "agent@example.com"),
        ("SMTP_APP_PASSWORD", "secret"),
        ("RETRY_BASE_DELAY_MS", "0"),
    ]);
    Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
        .expect("test configuration is complete")
}

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

pub fn fixture(id: i64, home: &str, away: &str, date: &str) -> Fixture {
    let raw = json!({
        "fixture": {"id": id, "date": date},
        "teams": {"home": {"name": home}, "away": {"name": away}}
    });
    Fixture::from_raw(raw).expect("test fixture is well formed")
}

pub struct StubData {
    fixtures: Vec<Fixture>,
    requested: Mutex<Vec<i64>>,
}

impl StubData {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self {
            fixtures,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Fixture ids predictions were requested for, in call order
    pub fn requested_ids(&self) -> Vec<i64> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl FootballData for StubData {
    async fn get_today_fixtures(&self) -> Result<Vec<Fixture>> {
        Ok(self.fixtures.clone())
    }

    async fn get_predictions(&self, fixture_id: i64) -> Result<Vec<Value>> {
        self.requested.lock().unwrap().push(fixture_id);
        Ok(vec![json!({"fixture": fixture_id, "advice": "Winner"})])
    }

    async fn get_odds(&self, fixture_id: i64) -> Result<Vec<Value>> {
        Ok(vec![json!({"fixture": fixture_id, "bookmakers": []})])
    }
}

enum Reply {
    Fixed(String),
    EchoFixture,
    FailOn(i64),
    Panic,
}

pub struct StubAnalyzer {
    reply: Reply,
    languages: Mutex<Vec<Language>>,
}

impl StubAnalyzer {
    fn with(reply: Reply) -> Self {
        Self {
            reply,
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(Reply::Fixed(text.to_string()))
    }

    /// Replies "analysis of fixture {id}"
    pub fn echoing_fixture() -> Self {
        Self::with(Reply::EchoFixture)
    }

    pub fn failing_on(fixture_id: i64) -> Self {
        Self::with(Reply::FailOn(fixture_id))
    }

    pub fn panicking() -> Self {
        Self::with(Reply::Panic)
    }

    pub fn languages(&self) -> Vec<Language> {
        self.languages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(
        &self,
        fixture: &Fixture,
        _predictions: &[Value],
        _odds: &[Value],
        language: Language,
    ) -> Result<String> {
        self.languages.lock().unwrap().push(language);
        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::EchoFixture => Ok(format!("analysis of fixture {}", fixture.id)),
            Reply::FailOn(id) if *id == fixture.id => bail!("completion service unreachable"),
            Reply::FailOn(_) => Ok("tip".to_string()),
            Reply::Panic => panic!("analyzer blew up"),
        }
    }
}

pub struct RecordingCompletion {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingCompletion {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => bail!("connection refused"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub subject: String,
    pub body: String,
    pub recipient: String,
    pub language: Language,
}

#[derive(Default)]
pub struct RecordingMailer {
    fail: bool,
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportMailer for RecordingMailer {
    async fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
        language: Language,
    ) -> Result<()> {
        if self.fail {
            bail!("SMTP unavailable");
        }
        self.sent.lock().unwrap().push(SentMail {
            subject: subject.to_string(),
            body: body.to_string(),
            recipient: recipient.to_string(),
            language,
        });
        Ok(())
    }
}
