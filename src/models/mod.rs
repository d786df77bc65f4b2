use crate::error::UpstreamError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Report and email language. Anything other than "en" is Polish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    Pl,
    En,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => Language::En,
            _ => Language::Pl,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::Pl => "pl",
            Language::En => "en",
        }
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Language::from_code(&code)
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.code().to_string()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One upcoming match as returned by the fixtures endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: i64,
    pub home: String,
    pub away: String,
    /// Kickoff timestamp exactly as the provider sent it
    pub date: String,
    /// The untouched provider item, embedded into the analysis prompt
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
struct FixtureItem {
    fixture: FixtureInfo,
    teams: FixtureTeams,
}

#[derive(Debug, Deserialize)]
struct FixtureInfo {
    id: i64,
    date: String,
}

#[derive(Debug, Deserialize)]
struct FixtureTeams {
    home: TeamInfo,
    away: TeamInfo,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    name: String,
}

impl Fixture {
    pub fn from_raw(raw: Value) -> Result<Self, UpstreamError> {
        let item = FixtureItem::deserialize(&raw)
            .map_err(|e| UpstreamError::MalformedFixture(e.to_string()))?;

        Ok(Self {
            id: item.fixture.id,
            home: item.teams.home.name,
            away: item.teams.away.name,
            date: item.fixture.date,
            raw,
        })
    }
}

/// Outcome of assembling the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// The provider had no upcoming fixtures
    NoFixtures,
    Ready(String),
}

impl Report {
    pub fn into_text(self, language: Language) -> String {
        match self {
            Report::NoFixtures => no_matches_message(language).to_string(),
            Report::Ready(text) => text,
        }
    }
}

/// Result of one agent run, as shown to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub success: bool,
    pub message: String,
}

impl RunOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub fn no_matches_message(language: Language) -> &'static str {
    match language {
        Language::Pl => "Brak meczów na dziś.",
        Language::En => "No matches today.",
    }
}

pub fn report_sent_message(language: Language) -> &'static str {
    match language {
        Language::Pl => "Raport został wygenerowany i wysłany na podany email.",
        Language::En => "Report has been generated and sent to the provided email.",
    }
}

pub fn report_error_message(language: Language, err: &anyhow::Error) -> String {
    match language {
        Language::Pl => format!("Błąd podczas generowania raportu: {:#}", err),
        Language::En => format!("Error generating report: {:#}", err),
    }
}

pub fn internal_error_message(language: Language) -> &'static str {
    match language {
        Language::Pl => "Wewnętrzny błąd serwera",
        Language::En => "Internal server error",
    }
}
