use anyhow::{bail, Result};
use clap::Parser;
use football_ai_agent::{Agent, Config, Language, RunOutcome};
use tracing_subscriber::EnvFilter;

/// Analyze the upcoming football fixtures and email the report
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Recipient address (defaults to RECIPIENT_EMAIL)
    #[arg(long)]
    email: Option<String>,

    /// Report language: "pl" or "en"; anything else falls back to "pl"
    #[arg(long, default_value = "pl")]
    language: String,

    /// Print the report instead of sending it
    #[arg(long)]
    print_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let language = Language::from_code(&args.language);

    let config = Config::from_env()?;
    let agent = Agent::from_config(&config)?;

    if args.print_only {
        println!("Analyzing matches...\n");
        let report = agent.build_report(language).await?;
        println!("{}", report.into_text(language));
        return Ok(());
    }

    let recipient = args.email.unwrap_or_else(|| config.recipient_email.clone());

    println!("Analyzing matches for {} ({})...", recipient, language);
    let outcome = agent.run_for_recipient(&recipient, language).await;

    println!("{}", into_result(outcome)?);
    Ok(())
}

/// A failed run becomes the process error, so the exit status is non-zero
fn into_result(outcome: RunOutcome) -> Result<String> {
    if !outcome.success {
        bail!("{}", outcome.message);
    }
    Ok(outcome.message)
}
