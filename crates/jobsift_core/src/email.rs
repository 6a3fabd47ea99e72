use serde::Serialize;

/// A raw inbound email as handed over by the mailbox collaborator.
///
/// Immutable for the duration of a run; the body may be HTML or plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEmail {
    pub sender: String,
    pub subject: String,
    /// Opaque display-only date string; never parsed.
    pub date: String,
    pub body: String,
}

impl RawEmail {
    /// Fixed-delimiter representation used both for token sampling and for
    /// the model prompt, so size estimates track what is actually sent.
    pub fn formatted(&self) -> String {
        format!(
            "From: {}\nSubject: {}\nDate: {}\n\n{}",
            self.sender, self.subject, self.date, self.body
        )
    }
}

/// One node of a nested message-part structure.
///
/// Mailbox collaborators deliver multipart messages as a tree; leaves carry
/// a body, inner nodes only group children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Body { content: String, is_html: bool },
    Multipart { children: Vec<MessagePart> },
}

impl MessagePart {
    /// Depth-first search for an HTML body, falling back to the first
    /// plain-text body when no part carries HTML.
    pub fn preferred_body(&self) -> Option<&str> {
        self.find_body(true).or_else(|| self.find_body(false))
    }

    fn find_body(&self, want_html: bool) -> Option<&str> {
        match self {
            MessagePart::Body { content, is_html } if *is_html == want_html => Some(content),
            MessagePart::Body { .. } => None,
            MessagePart::Multipart { children } => {
                children.iter().find_map(|child| child.find_body(want_html))
            }
        }
    }
}

/// A link that survived structural filtering, before redirect resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub url: String,
    pub anchor_text: String,
}

/// Result of probing one URL's redirect chain.
///
/// Failures are data, not errors: `final_url` falls back to `original_url`
/// and `failure_reason` names the cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectOutcome {
    pub original_url: String,
    pub final_url: String,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
}

impl RedirectOutcome {
    pub fn resolved(original_url: impl Into<String>, final_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            final_url: final_url.into(),
            succeeded: true,
            failure_reason: None,
        }
    }

    pub fn failed(original_url: impl Into<String>, reason: impl Into<String>) -> Self {
        let original_url = original_url.into();
        Self {
            final_url: original_url.clone(),
            original_url,
            succeeded: false,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Terminal output unit: one job posting attributed to its source email.
///
/// Ordering is extraction order within an email, emails in input order.
/// Duplicates across emails are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobListing {
    pub email_from: String,
    pub email_subject: String,
    pub email_date: String,
    pub job_title: String,
    pub job_link: String,
}
