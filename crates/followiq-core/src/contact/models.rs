use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_COMPANY_LEN: usize = 100;
pub const MAX_MESSAGE_LEN: usize = 2000;

/// A message left through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl ContactSubmission {
    /// First line of the message, cut at `max_len` characters
    pub fn preview(&self, max_len: usize) -> String {
        let first_line = self.message.lines().next().unwrap_or("");
        match first_line.char_indices().nth(max_len) {
            Some((idx, _)) => format!("{}...", &first_line[..idx]),
            None => first_line.to_string(),
        }
    }
}

/// Data required to create a contact submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub message: String,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

impl NewContactSubmission {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        company: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            company,
            message: message.into(),
        }
    }

    /// Trim fields, drop an empty company and check every limit
    pub fn validated(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_lowercase();
        let message = self.message.trim().to_string();
        let company = self
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if name.is_empty() {
            return Err(Error::Validation("name is required".to_string()));
        }
        check_len("name", &name, MAX_NAME_LEN)?;

        if email.is_empty() {
            return Err(Error::Validation("email is required".to_string()));
        }
        check_len("email", &email, MAX_EMAIL_LEN)?;
        if !email_regex().is_match(&email) {
            return Err(Error::Validation(format!("'{}' is not a valid email", email)));
        }

        if let Some(ref company) = company {
            check_len("company", company, MAX_COMPANY_LEN)?;
        }

        if message.is_empty() {
            return Err(Error::Validation("message is required".to_string()));
        }
        check_len("message", &message, MAX_MESSAGE_LEN)?;

        Ok(Self {
            name,
            email,
            company,
            message,
        })
    }
}
