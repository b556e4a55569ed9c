//! CellGate Policy - the location-access decision engine
//!
//! This crate holds the decision procedure that gates callers' access to
//! cell-location-derived data, plus the collaborator capability traits it
//! consults. The engine is stateless; all platform state is owned by the
//! collaborators and read through the traits.

pub mod context;
pub mod engine;
pub mod traits;

pub use context::AccessContext;
pub use engine::{AccessDecisionEngine, AccessOutcome, DenialReason, MAX_LEGACY_TARGET_SDK};
pub use traits::{
    AppOpsTracker, CrossUserChecker, ForegroundAppOracle, LocationMode, LocationModeProvider,
    OpCode, OpMode, PackageInfoOracle, PackageNotFound, PackageOpsValidator, PermissionEnforcer,
    UserStateOracle, ACCESS_COARSE_LOCATION, ACCESS_FINE_LOCATION, INTERACT_ACROSS_USERS_FULL,
};
