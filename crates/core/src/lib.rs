//! CellGate Core - shared types for the location-access policy
//!
//! This crate provides the pieces every other CellGate crate agrees on:
//! the error taxonomy (hard failures vs. ambient errors), caller identity
//! types, and the decision audit bus.

pub mod audit;
pub mod error;
pub mod identity;

pub use audit::{AuditBus, AuditEvent, AuditRecord, AuditSubscription};
pub use error::{CellGateError, Result};
pub use identity::{CallerIdentity, Uid, UserId, PER_USER_UID_RANGE};

/// CellGate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
