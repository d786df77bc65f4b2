use crate::analyzer::Analyzer;
use crate::api::FootballData;
use crate::models::{Language, Report};
use crate::utils::kickoff::format_kickoff;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Line separating fixture blocks in the text report
pub const REPORT_DELIMITER: &str = "==============================";

pub struct ReportBuilder {
    data: Arc<dyn FootballData>,
    analyzer: Arc<dyn Analyzer>,
}

impl ReportBuilder {
    pub fn new(data: Arc<dyn FootballData>, analyzer: Arc<dyn Analyzer>) -> Self {
        Self { data, analyzer }
    }

    /// Analyze every upcoming fixture, one at a time, in provider order.
    /// The first failing fixture aborts the whole report.
    pub async fn build_report(&self, language: Language) -> Result<Report> {
        let fixtures = self
            .data
            .get_today_fixtures()
            .await
            .context("Failed to fetch fixtures")?;

        if fixtures.is_empty() {
            info!("No upcoming fixtures");
            return Ok(Report::NoFixtures);
        }

        let total = fixtures.len();
        let mut report = String::new();

        for (i, fixture) in fixtures.iter().enumerate() {
            info!(
                "Analyzing fixture {}/{}: {} vs {} (id {})",
                i + 1,
                total,
                fixture.home,
                fixture.away,
                fixture.id
            );

            let kickoff = format_kickoff(&fixture.date)
                .with_context(|| format!("Bad kickoff time for fixture {}", fixture.id))?;

            let predictions = self
                .data
                .get_predictions(fixture.id)
                .await
                .with_context(|| format!("Failed to fetch predictions for fixture {}", fixture.id))?;
            let odds = self
                .data
                .get_odds(fixture.id)
                .await
                .with_context(|| format!("Failed to fetch odds for fixture {}", fixture.id))?;

            let analysis = self
                .analyzer
                .analyze(fixture, &predictions, &odds, language)
                .await?;

            report.push('\n');
            report.push_str(REPORT_DELIMITER);
            report.push('\n');
            report.push_str(&format!("{} vs {}\n", fixture.home, fixture.away));
            report.push_str(&kickoff);
            report.push('\n');
            report.push_str(&analysis);
            report.push('\n');
        }

        Ok(Report::Ready(report))
    }
}
