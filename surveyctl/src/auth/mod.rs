//! Respondent authentication.
//!
//! A respondent proves who they are by presenting the email and access token the survey
//! platform issued them for a module. There are no accounts and no sessions: every lookup
//! re-authenticates against that module's token table.
//!
//! # Modules
//!
//! - [`source`]: Where token tables come from ([`CredentialSource`] and its MySQL implementation)
//! - [`authenticator`]: Cached comparison of a submitted pair against a token table

pub mod authenticator;
pub mod source;

pub use authenticator::Authenticator;
pub use source::{CredentialSource, MySqlCredentialSource};
