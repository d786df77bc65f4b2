use crate::config::Config;
use crate::models::Language;
use crate::report::REPORT_DELIMITER;
use crate::utils::retry::{retry, RetryPolicy};
use anyhow::{Context, Result};
use askama::Template;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

const RULE_HTML: &str = r#"<hr style="border: 1px solid #ddd; margin: 20px 0;">"#;

/// Localized texts shown above the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderTexts {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub description: &'static str,
}

pub fn header_texts(language: Language) -> HeaderTexts {
    match language {
        Language::Pl => HeaderTexts {
            title: "Agent AI czatsportowy.pl",
            subtitle: "Sekcja: Piłka nożna",
            description: "Poniżej analizy najbliższych kilku meczów:",
        },
        Language::En => HeaderTexts {
            title: "AI Agent czatsportowy.pl",
            subtitle: "Section: Football",
            description: "Below are the analyses of the upcoming matches:",
        },
    }
}

#[derive(Template)]
#[template(path = "report_email.html")]
struct ReportEmailTemplate<'a> {
    lang: &'a str,
    title: &'a str,
    subtitle: &'a str,
    description: &'a str,
    report_html: &'a str,
}

/// Line breaks become `<br>`, delimiter lines become a horizontal rule.
/// Nothing else in the text is touched.
pub fn report_to_html(text: &str) -> String {
    text.replace('\n', "<br>").replace(REPORT_DELIMITER, RULE_HTML)
}

/// Full HTML document for the report email
pub fn render_email_html(text: &str, language: Language) -> Result<String> {
    let texts = header_texts(language);
    let report_html = report_to_html(text);

    ReportEmailTemplate {
        lang: language.code(),
        title: texts.title,
        subtitle: texts.subtitle,
        description: texts.description,
        report_html: &report_html,
    }
    .render()
    .context("Failed to render report email")
}

/// Plain text first, HTML last so mail clients prefer the HTML part
pub fn build_message(
    from: &Mailbox,
    subject: &str,
    text: &str,
    recipient: &str,
    language: Language,
) -> Result<Message> {
    let to: Mailbox = recipient
        .parse()
        .with_context(|| format!("Invalid recipient address: {}", recipient))?;
    let html = render_email_html(text, language)?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .multipart(MultiPart::alternative_plain_html(text.to_string(), html))
        .context("Failed to build report email")
}

/// Delivers a finished report to one recipient
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
        language: Language,
    ) -> Result<()>;
}

/// Sends mail through an implicit-TLS SMTP relay with login credentials
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    retry: RetryPolicy,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Result<Self> {
        let from: Mailbox = config
            .smtp_email
            .parse()
            .with_context(|| format!("Invalid SMTP_EMAIL address: {}", config.smtp_email))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)
            .with_context(|| format!("Failed to set up SMTP relay {}", config.smtp_server))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_email.clone(),
                config.smtp_app_password.clone(),
            ))
            .timeout(Some(config.http_timeout))
            .build();

        Ok(Self {
            from,
            transport,
            retry: config.retry,
        })
    }
}

#[async_trait]
impl ReportMailer for SmtpMailer {
    async fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
        language: Language,
    ) -> Result<()> {
        let message = build_message(&self.from, subject, body, recipient, language)?;

        // Only transient SMTP replies are retried, so a message is never sent twice
        retry(&self.retry, "SMTP", || async {
            self.transport
                .send(message.clone())
                .await
                .context("Failed to send report email")?;
            Ok(())
        })
        .await?;

        info!("Report email sent to {}", recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\n==============================\nA vs B\n2025-03-10 19:00\nNo valuable tips based on statistics.\n";

    #[test]
    fn test_report_to_html() {
        assert_eq!(
            report_to_html(REPORT),
            format!(
                "<br>{}<br>A vs B<br>2025-03-10 19:00<br>No valuable tips based on statistics.<br>",
                RULE_HTML
            )
        );
    }

    #[test]
    fn test_report_to_html_leaves_other_text_alone() {
        let text = "Tip: Over 2.5 <goals> & \"BTTS\" = yes";
        assert_eq!(report_to_html(text), text);
        assert_eq!(report_to_html("a\n\nb"), "a<br><br>b");
    }

    #[test]
    fn test_header_texts() {
        assert_eq!(header_texts(Language::Pl).subtitle, "Sekcja: Piłka nożna");
        assert_eq!(header_texts(Language::En).subtitle, "Section: Football");
    }

    #[test]
    fn test_render_email_html() {
        let html = render_email_html(REPORT, Language::En).unwrap();
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("<h1>AI Agent czatsportowy.pl</h1>"));
        assert!(html.contains("Below are the analyses of the upcoming matches:"));
        assert!(html.contains(&report_to_html(REPORT)));
        assert!(html.contains("czatsportowy.pl - Twój przewodnik po świecie sportu"));

        let html = render_email_html(REPORT, Language::Pl).unwrap();
        assert!(html.contains(r#"<html lang="pl">"#));
        assert!(html.contains("<h1>Agent AI czatsportowy.pl</h1>"));
    }

    #[test]
    fn test_build_message_is_plain_then_html() {
        let from: Mailbox = "agent@example.com".parse().unwrap();
        let message = build_message(
            &from,
            "AGENT AI CZATSPORTOWY.PL",
            REPORT,
            "reader@example.com",
            Language::En,
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("Subject: AGENT AI CZATSPORTOWY.PL"));
        assert!(raw.contains("reader@example.com"));
        assert!(raw.contains("multipart/alternative"));
        let plain = raw.find("Content-Type: text/plain").unwrap();
        let html = raw.find("Content-Type: text/html").unwrap();
        assert!(plain < html);
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let from: Mailbox = "agent@example.com".parse().unwrap();
        let err = build_message(&from, "s", REPORT, "not-an-address", Language::Pl).unwrap_err();
        assert!(err.to_string().contains("not-an-address"));
    }
}
