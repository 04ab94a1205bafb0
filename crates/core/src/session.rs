//! Session record and the inputs that create or modify one.

use serde::Serialize;

use crate::duration::SessionDuration;
use crate::error::CoreError;
use crate::types::{SessionId, Timestamp};

/// Display name recorded when the client does not supply one.
pub const DEFAULT_FULL_NAME: &str = "Anonymous";

/// One active session. Owned by the store; callers get clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub full_name: String,
    pub email: String,
    pub nickname: String,
    pub client_ip: String,
    pub client_mac: String,
    pub server_ip: String,
    pub server_mac: String,
    pub created_at: Timestamp,
    pub last_accessed_at: Timestamp,
}

/// Input for starting a session.
///
/// Identity fields arrive as options so that missing values are reported as
/// validation failures rather than deserialization errors.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub client_ip: String,
    pub client_mac: String,
}

/// Validated identity fields for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub full_name: String,
    pub email: String,
    pub nickname: String,
}

impl NewSession {
    /// Check required fields. `email` and `nickname` must be present and
    /// non-blank; `full_name` falls back to [`DEFAULT_FULL_NAME`].
    pub(crate) fn validate(&self) -> Result<Identity, CoreError> {
        let mut missing = Vec::new();
        let email = non_blank(self.email.as_deref());
        let nickname = non_blank(self.nickname.as_deref());
        if email.is_none() {
            missing.push("email");
        }
        if nickname.is_none() {
            missing.push("nickname");
        }
        match (email, nickname) {
            (Some(email), Some(nickname)) => {
                validate_email(email)?;
                Ok(Identity {
                    full_name: non_blank(self.full_name.as_deref())
                        .unwrap_or(DEFAULT_FULL_NAME)
                        .to_string(),
                    email: email.to_string(),
                    nickname: nickname.to_string(),
                })
            }
            _ => Err(CoreError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Partial identity update. `None` or blank values leave the field as is.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
}

impl SessionUpdate {
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        if let Some(email) = non_blank(self.email.as_deref()) {
            validate_email(email)?;
        }
        Ok(())
    }

    pub(crate) fn apply(&self, record: &mut SessionRecord) {
        if let Some(full_name) = non_blank(self.full_name.as_deref()) {
            record.full_name = full_name.to_string();
        }
        if let Some(email) = non_blank(self.email.as_deref()) {
            record.email = email.to_string();
        }
        if let Some(nickname) = non_blank(self.nickname.as_deref()) {
            record.nickname = nickname.to_string();
        }
    }
}

/// A record copied out of the store together with its durations at
/// `observed_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub record: SessionRecord,
    pub observed_at: Timestamp,
    pub age: SessionDuration,
    pub idle: SessionDuration,
}

impl SessionSnapshot {
    pub fn observe(record: SessionRecord, now: Timestamp) -> Self {
        Self {
            age: SessionDuration::between(record.created_at, now),
            idle: SessionDuration::between(record.last_accessed_at, now),
            observed_at: now,
            record,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}
