//! CellGate - location-access authorization for cell data
//!
//! A caller (package name + uid) may read cell-location-derived data only
//! when a fixed sequence of checks passes: the package/uid binding is
//! real, the coarse location permission is held, the app-ops layer allows
//! and accounts the access, the caller's user has location enabled (or
//! the caller is a legacy app in the foreground), and the caller's user
//! is visible from the current profile.
//!
//! ## Architecture
//!
//! CellGate is organized into specialized crates:
//!
//! - `cellgate-core`: error taxonomy, caller identity, decision audit bus
//! - `cellgate-policy`: the decision engine and collaborator traits
//! - `cellgate-platform`: simulated platform state behind the traits
//! - `cellgate-telephony`: gated cell-info query surface
//!
//! The root crate adds the scenario runner, which evaluates TOML-described
//! access requests against a TOML-described device.

#![warn(clippy::all)]

pub mod scenario;

// Re-export main components for library usage
pub use cellgate_core as core;
pub use cellgate_platform as platform;
pub use cellgate_policy as policy;
pub use cellgate_telephony as telephony;

/// CellGate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use cellgate_core::{AuditBus, CallerIdentity, CellGateError, Result, Uid, UserId};
    pub use cellgate_platform::{DeviceConfig, SimulatedPlatform};
    pub use cellgate_policy::{
        AccessContext, AccessDecisionEngine, AccessOutcome, DenialReason,
    };
    pub use cellgate_telephony::CellInfoService;
}
