//! Domain types shared by the campaign sender and the open tracker.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::Error;

/// Name of the field holding the destination address.
pub const EMAIL_FIELD: &str = "email";

/// One row of the recipient source.
///
/// All columns are kept in `fields` so they can be used as template
/// placeholders; the address and the group are extracted up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientRecord {
    email: String,
    group: String,
    fields: HashMap<String, String>,
}

impl RecipientRecord {
    /// Builds a record, requiring non-blank `email` and `group_field` values.
    ///
    /// Values are kept exactly as given; `"IT "` and `"IT"` are different
    /// groups.
    pub fn try_new(fields: HashMap<String, String>, group_field: &str) -> Result<Self, Error> {
        let required = |name: &str| {
            fields
                .get(name)
                .filter(|value| !value.trim().is_empty())
                .cloned()
                .ok_or_else(|| Error::RecipientSource(format!("missing required field `{name}`")))
        };
        let email = required(EMAIL_FIELD)?;
        let group = required(group_field)?;

        Ok(Self {
            email,
            group,
            fields,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

/// Recipient selection applied by the dispatch engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    All,
    Only(String),
}

impl GroupFilter {
    pub fn matches(&self, record: &RecipientRecord) -> bool {
        match self {
            GroupFilter::All => true,
            GroupFilter::Only(group) => record.group() == group,
        }
    }
}

impl From<&str> for GroupFilter {
    fn from(value: &str) -> Self {
        match value {
            "all" => GroupFilter::All,
            group => GroupFilter::Only(group.to_owned()),
        }
    }
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The remote server rejected the destination address.
    Bounced(String),
    Failed(String),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

/// Delivery counters for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub sent: usize,
    pub failed: usize,
}

/// Per-group statistics accumulated over a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignReport {
    groups: BTreeMap<String, GroupCounts>,
}

impl CampaignReport {
    pub fn record(&mut self, group: &str, outcome: &SendOutcome) {
        let counts = self.groups.entry(group.to_owned()).or_default();
        if outcome.is_sent() {
            counts.sent += 1;
        } else {
            counts.failed += 1;
        }
    }

    pub fn get(&self, group: &str) -> Option<&GroupCounts> {
        self.groups.get(group)
    }

    pub fn groups(&self) -> &BTreeMap<String, GroupCounts> {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of recipients a send was attempted for.
    pub fn attempted(&self) -> usize {
        self.groups
            .values()
            .map(|counts| counts.sent + counts.failed)
            .sum()
    }
}

impl fmt::Display for CampaignReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(40);
        writeln!(f, "Email Sending Report:")?;
        writeln!(f, "{separator}")?;
        for (group, counts) in &self.groups {
            writeln!(f, "Department: {group}")?;
            writeln!(f, "Sent: {}", counts.sent)?;
            writeln!(f, "Failed: {}", counts.failed)?;
            writeln!(f, "{separator}")?;
        }
        Ok(())
    }
}

/// A recorded fetch of the tracking pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenEvent {
    pub id: i32,
    pub email: Option<String>,
    pub timestamp: NaiveDateTime,
}

/// A pixel fetch that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOpenEvent<'a> {
    pub email: Option<&'a str>,
    pub timestamp: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn record_requires_email_and_group() {
        let ok = RecipientRecord::try_new(
            fields(&[("email", "a@x.com"), ("department", "IT")]),
            "department",
        )
        .unwrap();
        assert_eq!(ok.email(), "a@x.com");
        assert_eq!(ok.group(), "IT");

        let missing_group =
            RecipientRecord::try_new(fields(&[("email", "a@x.com")]), "department");
        assert!(matches!(missing_group, Err(Error::RecipientSource(_))));

        let empty_email = RecipientRecord::try_new(
            fields(&[("email", "  "), ("department", "IT")]),
            "department",
        );
        assert!(matches!(empty_email, Err(Error::RecipientSource(_))));
    }

    #[test]
    fn filter_parses_all_keyword() {
        assert_eq!(GroupFilter::from("all"), GroupFilter::All);
        assert_eq!(GroupFilter::from("HR"), GroupFilter::Only("HR".into()));
        assert_eq!(GroupFilter::from("HR "), GroupFilter::Only("HR ".into()));
    }

    #[test]
    fn report_counts_and_renders() {
        let mut report = CampaignReport::default();
        report.record("IT", &SendOutcome::Sent);
        report.record("IT", &SendOutcome::Bounced("550".into()));
        report.record("HR", &SendOutcome::Failed("timeout".into()));

        assert_eq!(report.get("IT"), Some(&GroupCounts { sent: 1, failed: 1 }));
        assert_eq!(report.get("HR"), Some(&GroupCounts { sent: 0, failed: 1 }));
        assert_eq!(report.attempted(), 3);

        let text = report.to_string();
        assert!(text.starts_with("Email Sending Report:\n"));
        assert!(text.contains("Department: IT\nSent: 1\nFailed: 1\n"));
    }
}
