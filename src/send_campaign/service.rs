use async_trait::async_trait;
use mail_send::mail_builder::MessageBuilder;

use crate::domain::{CampaignReport, GroupFilter, RecipientRecord, SendOutcome};

use super::message_builder::{build_message, inject_tracking_pixel, render_template};
use super::pacing::{Pacer, PacingPolicy, Pause};

/// Abstraction over message delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Performs one delivery attempt to `recipient` and classifies it.
    async fn send(&self, recipient: &str, message: MessageBuilder<'_>) -> SendOutcome;
}

/// Content and targeting shared by every message of a campaign.
#[derive(Debug, Clone)]
pub struct Campaign<'a> {
    pub sender: &'a str,
    pub subject_template: &'a str,
    pub body_template: &'a str,
    pub tracking_url: &'a str,
    pub filter: GroupFilter,
}

/// Sends the campaign to every matching recipient, one at a time and in
/// source order, pacing sends according to `pacing`.
///
/// Delivery problems are tallied in the returned report and never stop
/// the campaign.
pub async fn run_campaign<M, P>(
    recipients: &[RecipientRecord],
    campaign: &Campaign<'_>,
    pacing: &PacingPolicy,
    mailer: &M,
    pacer: &P,
) -> CampaignReport
where
    M: Mailer,
    P: Pacer,
{
    let mut report = CampaignReport::default();
    let mut attempted = 0usize;

    for recipient in recipients {
        if !campaign.filter.matches(recipient) {
            continue;
        }

        let subject = render_template(campaign.subject_template, recipient.fields());
        let body = render_template(campaign.body_template, recipient.fields());
        let body = inject_tracking_pixel(&body, campaign.tracking_url);
        let message = build_message(campaign.sender, recipient.email(), subject, body);

        let outcome = mailer.send(recipient.email(), message).await;
        if outcome.is_sent() {
            log::info!("Email successfully sent to {}", recipient.email());
        }
        report.record(recipient.group(), &outcome);

        attempted += 1;
        if let Some(delay) = pacing.batch_pause(attempted) {
            log::info!(
                "Batch limit reached. Waiting for {} seconds before continuing...",
                delay.as_secs()
            );
            pacer.pause(Pause::Batch(delay)).await;
        }
        pacer.pause(Pause::Jitter(pacing.jitter())).await;
    }

    if attempted == 0 {
        log::warn!("No recipients matched filter {:?}", campaign.filter);
    }
    log::info!("Campaign finished: {attempted} messages attempted");

    report
}
