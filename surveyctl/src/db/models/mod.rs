//! Database record models matching the credential store's table schemas.

pub mod credentials;
