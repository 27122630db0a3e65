//! Authentication primitives.
//!
//! Tokens are issued by the account service that owns users and billing;
//! this server only verifies them.

pub mod jwt;
