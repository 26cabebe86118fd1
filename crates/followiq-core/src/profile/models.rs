use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

const MAX_FIELD_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 30;

/// Account details, one row per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Profile shown before the user has saved anything
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            display_name: None,
            phone: None,
            company_name: None,
            job_role: None,
            updated_at: None,
        }
    }
}

/// Fields to change; `None` leaves a field alone, an empty string clears it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub job_role: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.phone.is_none()
            && self.company_name.is_none()
            && self.job_role.is_none()
    }

    /// Validate and turn into the row sent to the backend
    pub fn to_row(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Value> {
        let mut row = Map::new();
        row.insert("user_id".to_string(), Value::String(user_id.to_string()));

        let fields = [
            ("display_name", &self.display_name, MAX_FIELD_LEN),
            ("phone", &self.phone, MAX_PHONE_LEN),
            ("company_name", &self.company_name, MAX_FIELD_LEN),
            ("job_role", &self.job_role, MAX_FIELD_LEN),
        ];
        for (name, value, max) in fields {
            let Some(value) = value else { continue };
            let trimmed = value.trim();
            if trimmed.chars().count() > max {
                return Err(Error::Validation(format!(
                    "{} must be at most {} characters",
                    name, max
                )));
            }
            if name == "phone" && !trimmed.is_empty() && !is_phone(trimmed) {
                return Err(Error::Validation(format!("'{}' is not a phone number", trimmed)));
            }
            let value = if trimmed.is_empty() {
                Value::Null
            } else {
                Value::String(trimmed.to_string())
            };
            row.insert(name.to_string(), value);
        }

        row.insert("updated_at".to_string(), Value::String(now.to_rfc3339()));
        Ok(Value::Object(row))
    }
}

fn is_phone(value: &str) -> bool {
    phone_regex().is_match(value)
}

/// 6 to 15 digits, optional leading `+`, spaces, dashes or parentheses between
fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        Regex::new(r"^\+?(?:[ ()\-]*\d){6,15}[ ()\-]*$").expect("phone pattern is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_row_skips_untouched_and_clears_empty() {
        let update = ProfileUpdate {
            display_name: Some("  Grace ".to_string()),
            company_name: Some(String::new()),
            ..Default::default()
        };
        let user_id = Uuid::new_v4();
        let row = update.to_row(user_id, Utc::now()).unwrap();

        assert_eq!(row["user_id"], user_id.to_string());
        assert_eq!(row["display_name"], "Grace");
        assert!(row["company_name"].is_null());
        assert!(row.get("phone").is_none());
        assert!(row.get("job_role").is_none());
        assert!(row.get("updated_at").is_some());
    }

    #[test]
    fn test_phone_validation() {
        assert!(is_phone("+55 11 98765-4321"));
        assert!(is_phone("(212) 555-0100"));
        assert!(!is_phone("call me"));
        assert!(!is_phone("12+34567"));
        assert!(!is_phone("123"));
        assert!(!is_phone("1234567890123456"));

        let update = ProfileUpdate {
            phone: Some("not a phone".to_string()),
            ..Default::default()
        };
        assert!(update.to_row(Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn test_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(!ProfileUpdate {
            job_role: Some("CEO".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
