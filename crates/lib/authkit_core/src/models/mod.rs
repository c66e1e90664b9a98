//! Authentication domain models.
//!
//! `Identity` is the persisted principal; `Claims` is the transient payload
//! carried inside a signed token.

pub mod claims;
pub mod identity;
