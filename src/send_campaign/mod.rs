pub mod message_builder;
pub mod pacing;
pub mod service;
pub mod source;

use std::time::Duration;

use async_trait::async_trait;
use mail_send::mail_builder::MessageBuilder;
use mail_send::smtp::message::IntoMessage;
use mail_send::{SmtpClient, SmtpClientBuilder};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::domain::{CampaignReport, GroupFilter, SendOutcome};
use crate::errors::Error;
use crate::settings::CampaignSettings;

use pacing::{PacingPolicy, SleepPacer};
use service::{Campaign, Mailer, run_campaign};
use source::{load_recipients, read_template};

/// SMTP mailer that leverages [`mail_send`].
///
/// Every call opens its own authenticated session, sends one message and
/// quits. No retries are made.
pub struct SmtpMailer {
    host: String,
    port: u16,
    username: String,
    password: String,
    implicit_tls: bool,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(settings: &CampaignSettings) -> Self {
        Self {
            host: settings.smtp_host.clone(),
            port: settings.smtp_port,
            username: settings.username.clone(),
            password: settings.password.clone(),
            implicit_tls: settings.implicit_tls,
            timeout: settings.timeout(),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, recipient: &str, message: MessageBuilder<'_>) -> SendOutcome {
        let connected = SmtpClientBuilder::new(self.host.as_str(), self.port)
            .implicit_tls(self.implicit_tls)
            .credentials((self.username.as_str(), self.password.as_str()))
            .timeout(self.timeout)
            .connect()
            .await;

        let outcome = match connected {
            Ok(client) => deliver(client, message).await,
            Err(e) => SendOutcome::Failed(e.to_string()),
        };

        match &outcome {
            SendOutcome::Sent => {}
            SendOutcome::Bounced(reason) => log::warn!("Bounce detected for {recipient}: {reason}"),
            SendOutcome::Failed(reason) => log::error!("Error sending to {recipient}: {reason}"),
        }
        outcome
    }
}

/// Runs one transaction over an established session and closes it.
///
/// Only a reply refusing a `RCPT TO` is a bounce. Refusals of `MAIL FROM`
/// or of the message data, and any transport problem, are failures.
pub async fn deliver<T>(mut client: SmtpClient<T>, message: MessageBuilder<'_>) -> SendOutcome
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let outcome = transact(&mut client, message).await;

    if let Err(e) = client.quit().await {
        log::debug!("Cannot close SMTP session cleanly: {e}");
    }
    outcome
}

async fn transact<T>(client: &mut SmtpClient<T>, message: MessageBuilder<'_>) -> SendOutcome
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let envelope = match message.into_message() {
        Ok(envelope) => envelope,
        Err(e) => return SendOutcome::Failed(e.to_string()),
    };

    let from = &envelope.mail_from;
    if let Err(e) = client.mail_from(from.email.as_ref(), &from.parameters).await {
        return SendOutcome::Failed(e.to_string());
    }

    for rcpt in &envelope.rcpt_to {
        if let Err(e) = client.rcpt_to(rcpt.email.as_ref(), &rcpt.parameters).await {
            return recipient_refusal(e);
        }
    }

    match client.data(envelope.body.as_ref()).await {
        Ok(()) => SendOutcome::Sent,
        Err(e) => SendOutcome::Failed(e.to_string()),
    }
}

/// Maps an error raised by `RCPT TO`: a server reply refusing the address
/// is a bounce, whatever its code; a broken connection is not.
fn recipient_refusal(error: mail_send::Error) -> SendOutcome {
    match error {
        mail_send::Error::UnexpectedReply(reply) => {
            SendOutcome::Bounced(format!("recipient refused: {reply}"))
        }
        other => SendOutcome::Failed(other.to_string()),
    }
}

/// Entry point for the campaign sender.
///
/// Settings, templates and recipients are validated before the first
/// message goes out; any problem there aborts the run.
pub async fn run(settings: &CampaignSettings) -> Result<CampaignReport, Error> {
    let pacing = PacingPolicy::new(settings.batch_size, settings.batch_delay())?;
    if settings.tracking_url.trim().is_empty() {
        return Err(Error::Config("Missed tracking URL".to_owned()));
    }

    let subject_template = read_template(&settings.subject_path)?;
    let body_template = read_template(&settings.body_path)?;
    let recipients = load_recipients(&settings.recipients_path, &settings.group_field)?;

    let campaign = Campaign {
        sender: settings.sender(),
        subject_template: &subject_template,
        body_template: &body_template,
        tracking_url: settings.tracking_url.trim(),
        filter: GroupFilter::from(settings.group_filter.as_str()),
    };
    let mailer = SmtpMailer::new(settings);

    log::info!(
        "Starting campaign via {}:{} for {} recipients (filter {:?}, batch size {})",
        settings.smtp_host,
        settings.smtp_port,
        recipients.len(),
        campaign.filter,
        pacing.batch_size()
    );

    Ok(run_campaign(&recipients, &campaign, &pacing, &mailer, &SleepPacer).await)
}
