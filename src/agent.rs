use crate::analyzer::{Analyzer, MatchAnalyzer};
use crate::api::completion_api::OpenAiClient;
use crate::api::football_api::FootballApiClient;
use crate::api::FootballData;
use crate::config::Config;
use crate::mailer::{ReportMailer, SmtpMailer};
use crate::models::{
    no_matches_message, report_error_message, report_sent_message, Language, Report, RunOutcome,
};
use crate::report::ReportBuilder;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

pub const EMAIL_SUBJECT: &str = "AGENT AI CZATSPORTOWY.PL";

/// Builds the report and mails it. The only place where pipeline errors are
/// turned into a result instead of being propagated.
pub struct Agent {
    reports: ReportBuilder,
    mailer: Arc<dyn ReportMailer>,
}

impl Agent {
    pub fn new(
        data: Arc<dyn FootballData>,
        analyzer: Arc<dyn Analyzer>,
        mailer: Arc<dyn ReportMailer>,
    ) -> Self {
        Self {
            reports: ReportBuilder::new(data, analyzer),
            mailer,
        }
    }

    /// Wire up the real API-Football, OpenAI and SMTP clients
    pub fn from_config(config: &Config) -> Result<Self> {
        let data = Arc::new(FootballApiClient::new(config)?);
        let completion = Arc::new(OpenAiClient::new(config)?);
        let analyzer = Arc::new(MatchAnalyzer::new(completion));
        let mailer = Arc::new(SmtpMailer::new(config)?);
        Ok(Self::new(data, analyzer, mailer))
    }

    pub async fn build_report(&self, language: Language) -> Result<Report> {
        self.reports.build_report(language).await
    }

    pub async fn run_for_recipient(&self, email: &str, language: Language) -> RunOutcome {
        info!("Analyzing matches for {} in language {}", email, language);

        match self.try_run(email, language).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Report for {} failed: {:#}", email, e);
                RunOutcome::failure(report_error_message(language, &e))
            }
        }
    }

    async fn try_run(&self, email: &str, language: Language) -> Result<RunOutcome> {
        let text = match self.reports.build_report(language).await? {
            Report::NoFixtures => return Ok(RunOutcome::failure(no_matches_message(language))),
            Report::Ready(text) => text,
        };

        info!("Sending report to {}", email);
        self.mailer
            .send_email(EMAIL_SUBJECT, &text, email, language)
            .await?;

        Ok(RunOutcome::success(report_sent_message(language)))
    }
}
