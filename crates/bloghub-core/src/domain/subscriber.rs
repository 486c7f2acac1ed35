use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Newsletter subscriber. The email is unique across subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    /// Where the subscription came from, e.g. `footer`.
    pub source: String,
    pub date: DateTime<Utc>,
}

impl Subscriber {
    /// Create a subscriber after validating and normalizing the email.
    pub fn new(email: &str, source: &str) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            email: normalize_email(email)?,
            source: source.trim().to_string(),
            date: Utc::now(),
        })
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.email.to_lowercase().contains(&query)
            || self.source.to_lowercase().contains(&query)
    }
}

/// Trim and lowercase an email, rejecting obviously malformed input.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(DomainError::Validation("Invalid email address".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Reader@Example.com ").unwrap(), "reader@example.com");
        assert!(normalize_email("").is_err());
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("a@b@c").is_err());
    }

    #[test]
    fn test_matches_email_or_source() {
        let subscriber = Subscriber::new("reader@example.com", "footer").unwrap();
        assert!(subscriber.matches("READER"));
        assert!(subscriber.matches("foot"));
        assert!(subscriber.matches(""));
        assert!(!subscriber.matches("popup"));
    }
}
