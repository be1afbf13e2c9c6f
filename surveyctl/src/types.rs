//! Common type definitions and input normalization.
//!
//! # ID Types
//!
//! - [`SurveyId`]: numeric survey identifier, used to name a module's credential table
//!
//! # Normalization
//!
//! Emails and tokens arrive from a form and from two external sources (the credential
//! store and the survey export), none of which agree on whitespace or casing. Every
//! comparison in the crate goes through the functions below so that both sides of an
//! equality check are normalized identically:
//!
//! - [`normalize_email`]: trimmed and lower-cased
//! - [`normalize_token`]: trimmed only; tokens are case-sensitive

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric survey identifier as assigned by the survey platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(pub u32);

impl fmt::Display for SurveyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize an email for comparison: surrounding whitespace removed, lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize a token for comparison: surrounding whitespace removed, case preserved.
pub fn normalize_token(token: &str) -> String {
    token.trim().to_string()
}
