use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::subscriber::normalize_email;
use crate::error::DomainError;

/// Triage state of a contact submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Read => "read",
            ContactStatus::Replied => "replied",
            ContactStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(ContactStatus::New),
            "read" => Ok(ContactStatus::Read),
            "replied" => Ok(ContactStatus::Replied),
            "archived" => Ok(ContactStatus::Archived),
            other => Err(DomainError::Validation(format!(
                "Unknown contact status: {other}"
            ))),
        }
    }
}

/// Message left through the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Contact form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactForm {
    /// Validate and turn the form into a `new` submission.
    pub fn into_submission(self) -> Result<ContactSubmission, DomainError> {
        if self.first_name.trim().is_empty() {
            return Err(DomainError::Validation("First name is required".to_string()));
        }
        if self.message.trim().is_empty() {
            return Err(DomainError::Validation("Message is required".to_string()));
        }
        let email = normalize_email(&self.email)?;

        Ok(ContactSubmission {
            id: Uuid::new_v4(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email,
            phone: self.phone.trim().to_string(),
            message: self.message.trim().to_string(),
            status: ContactStatus::New,
            created_at: Utc::now(),
        })
    }
}

/// Admin-side filter over submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub search: Option<String>,
    pub status: Option<ContactStatus>,
}

impl ContactFilter {
    pub fn matches(&self, submission: &ContactSubmission) -> bool {
        if let Some(status) = self.status {
            if submission.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                [
                    &submission.first_name,
                    &submission.last_name,
                    &submission.email,
                    &submission.message,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}
