//! Request-authorization matching for the Quartermaster server.
//!
//! This crate provides the security ruleset model and the matcher that
//! decides whether an incoming request may proceed:
//!
//! - [`PermitRule`], [`DenyRule`], [`SecurityConstraints`] — the two ordered
//!   rule lists loaded from configuration
//! - [`AccessMatcher`] — compiled rules, evaluated public-first with
//!   first-match-wins semantics and a default-deny fallback
//! - [`Decision`] — the authorization outcome; denial is a normal return
//!   value, never an error
//!
//! The matcher is pure and stateless: once built it can be shared freely
//! across request-handling tasks.

pub mod matcher;
pub mod rules;

pub use matcher::{AccessMatcher, AccessRequest, AccessRuleError, Decision};
pub use rules::{DenyRule, PermitRule, SecurityConstraints};
