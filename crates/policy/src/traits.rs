//! Collaborator capability traits
//!
//! Every platform service the decision consults is modeled as a narrow
//! trait: a live platform backs them with real services, tests substitute
//! fakes. The engine owns none of the state behind these interfaces and
//! only reads it, with the single exception of the app-ops note, which is
//! an accounting write.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cellgate_core::{Result, Uid, UserId};

/// Coarse location permission, the gate enforced before any policy
/// evaluation. Fine location implies coarse in the platform permission
/// model, so the engine never checks fine separately.
pub const ACCESS_COARSE_LOCATION: &str = "android.permission.ACCESS_COARSE_LOCATION";

/// Fine location permission.
pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";

/// Cross-user interaction permission consulted by the profile gate.
pub const INTERACT_ACROSS_USERS_FULL: &str = "android.permission.INTERACT_ACROSS_USERS_FULL";

/// Runtime op tracked by the app-ops layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpCode {
    CoarseLocation,
    FineLocation,
    NeighboringCells,
}

impl OpCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpCode::CoarseLocation => "COARSE_LOCATION",
            OpCode::FineLocation => "FINE_LOCATION",
            OpCode::NeighboringCells => "NEIGHBORING_CELLS",
        }
    }
}

/// Current mode of a runtime op for one `(uid, package)` binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpMode {
    /// The op may proceed.
    Allowed,
    /// The op is silently suppressed.
    Ignored,
    /// The op is rejected loudly on the caller side.
    Errored,
    /// The op falls back to the platform default behavior.
    Default,
}

impl OpMode {
    pub fn is_allowed(self) -> bool {
        matches!(self, OpMode::Allowed)
    }
}

/// Per-user location mode setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    Off,
    SensorsOnly,
    BatterySaving,
    HighAccuracy,
}

impl LocationMode {
    /// Anything but `Off` counts as enabled.
    pub fn is_enabled(self) -> bool {
        self != LocationMode::Off
    }
}

/// Lookup failure for a package that is not installed.
#[derive(Debug, Clone, Error)]
#[error("package not found: {0}")]
pub struct PackageNotFound(pub String);

/// Validates that a `(uid, package)` pair refers to a real,
/// currently-installed app binding.
pub trait PackageOpsValidator: Send + Sync {
    /// Errors with [`cellgate_core::CellGateError::InvalidCaller`] on a
    /// mismatched pair. Not a security denial; the call itself is
    /// malformed.
    fn check_package(&self, uid: Uid, package: &str) -> Result<()>;
}

/// Enforces manifest permission grants for the calling identity.
pub trait PermissionEnforcer: Send + Sync {
    /// Errors with [`cellgate_core::CellGateError::PermissionMissing`]
    /// when neither the caller nor an ancestor in the calling chain holds
    /// `permission`. `message` is attributed to the failure for auditing.
    fn enforce_calling_permission(&self, permission: &str, message: &str) -> Result<()>;
}

/// Runtime op accounting sitting on top of static permission grants.
pub trait AppOpsTracker: Send + Sync {
    /// Maps a permission to its runtime op, or `None` when runtime
    /// enforcement is not wired for that permission on this build.
    fn permission_to_op_code(&self, permission: &str) -> Option<OpCode>;

    /// Records one use of `op` attributed to `(uid, package)` and returns
    /// the current mode. The recording is the point: it feeds the op
    /// usage history, so this is a write, not a read.
    fn note_op(&self, op: OpCode, uid: Uid, package: &str) -> OpMode;
}

/// Per-user location mode setting store.
pub trait LocationModeProvider: Send + Sync {
    fn location_mode(&self, user: UserId) -> LocationMode;
}

/// Installed-package metadata.
pub trait PackageInfoOracle: Send + Sync {
    /// Declared target SDK of `package`.
    fn target_sdk_version(&self, package: &str) -> std::result::Result<u32, PackageNotFound>;
}

/// Foreground task query.
pub trait ForegroundAppOracle: Send + Sync {
    /// Owning package of the single most recent running task, if any.
    fn top_task_package(&self) -> Option<String>;
}

/// Current user and profile topology.
pub trait UserStateOracle: Send + Sync {
    /// The user currently considered active on the device.
    fn current_user(&self) -> UserId;

    /// Users in `user`'s profile group, including `user` itself.
    fn profile_group(&self, user: UserId) -> Vec<UserId>;

    /// Owning user of a uid. Platforms with a nonstandard uid layout can
    /// override this; the default uses the per-user uid range.
    fn user_id_from_uid(&self, uid: Uid) -> UserId {
        uid.user_id()
    }
}

/// INTERACT_ACROSS_USERS_FULL grant for the calling identity.
pub trait CrossUserChecker: Send + Sync {
    fn has_interact_across_users_full(&self) -> bool;
}
