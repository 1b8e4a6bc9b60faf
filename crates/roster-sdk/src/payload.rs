//! Parsing of user request bodies.
//!
//! A missing body and an unparsable body are different failures and are
//! reported as such; neither is folded into the other.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// No body was supplied (or it was blank).
    #[error("request body missing")]
    Absent,

    /// The body was not a JSON object of the expected shape.
    #[error("Wrong format: {0}")]
    Malformed(String),

    /// A required field was absent, null or empty.
    #[error("{0} missing")]
    MissingField(&'static str),
}

#[derive(Deserialize)]
struct RawUser {
    email: Option<String>,
    password: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Fields accepted when creating a user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NewUser {
    /// Parse a creation body. `email` and `password` must be non-empty.
    pub fn from_body(body: Option<&str>) -> Result<Self, PayloadError> {
        let raw: RawUser = parse_object(body)?;
        Ok(Self {
            email: required(raw.email, "email")?,
            password: required(raw.password, "password")?,
            first_name: raw.first_name,
            last_name: raw.last_name,
        })
    }
}

/// Fields accepted when updating a user. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserUpdate {
    pub fn from_body(body: Option<&str>) -> Result<Self, PayloadError> {
        let raw: RawUser = parse_object(body)?;
        Ok(Self {
            first_name: raw.first_name,
            last_name: raw.last_name,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none()
    }
}

fn parse_object<T: for<'de> Deserialize<'de>>(body: Option<&str>) -> Result<T, PayloadError> {
    let body = match body {
        Some(b) if !b.trim().is_empty() => b,
        _ => return Err(PayloadError::Absent),
    };
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PayloadError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(PayloadError::Malformed("expected a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| PayloadError::Malformed(e.to_string()))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, PayloadError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PayloadError::MissingField(field)),
    }
}
