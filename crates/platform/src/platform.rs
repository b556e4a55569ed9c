//! Simulated Platform
//!
//! In-memory stand-in for the platform services the decision consults.
//! Implements every collaborator trait over lock-guarded device state and
//! records app-ops notes, so tests and the scenario runner can observe
//! the accounting side effect.
//!
//! The calling identity is ambient, as it is on a real platform: the host
//! sets the calling uid before evaluating a request and clears it after.
//! Permission enforcement and the cross-user check read it from there.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use cellgate_core::{CellGateError, Result, Uid, UserId};
use cellgate_policy::{
    AppOpsTracker, CrossUserChecker, ForegroundAppOracle, LocationMode, LocationModeProvider,
    OpCode, OpMode, PackageInfoOracle, PackageNotFound, PackageOpsValidator, PermissionEnforcer,
    UserStateOracle, ACCESS_COARSE_LOCATION, ACCESS_FINE_LOCATION, INTERACT_ACROSS_USERS_FULL,
};

use crate::config::{DeviceConfig, PackageConfig, UserConfig};

/// One recorded app-ops accounting entry.
#[derive(Debug, Clone)]
pub struct NotedOp {
    pub op: OpCode,
    pub uid: Uid,
    pub package: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PackageRecord {
    uid: Uid,
    target_sdk: u32,
    permissions: Vec<String>,
    op_mode: OpMode,
}

#[derive(Debug, Clone)]
struct UserRecord {
    location_mode: LocationMode,
    profiles: Vec<UserId>,
}

struct DeviceState {
    current_user: UserId,
    users: IndexMap<UserId, UserRecord>,
    packages: IndexMap<String, PackageRecord>,
    foreground: Option<String>,
    coarse_op_wired: bool,
    calling_uid: Option<Uid>,
    noted_ops: Vec<NotedOp>,
}

impl DeviceState {
    /// Whether any package running as `uid` holds `permission`. Fine
    /// location implies coarse here, in the permission model, not in the
    /// engine.
    fn uid_holds(&self, uid: Uid, permission: &str) -> bool {
        self.packages.values().filter(|p| p.uid == uid).any(|p| {
            p.permissions.iter().any(|granted| {
                granted == permission
                    || (permission == ACCESS_COARSE_LOCATION && granted == ACCESS_FINE_LOCATION)
            })
        })
    }
}

/// Simulated device implementing every collaborator trait.
pub struct SimulatedPlatform {
    state: RwLock<DeviceState>,
}

impl SimulatedPlatform {
    /// Build a platform from a validated device description.
    pub fn new(config: DeviceConfig) -> Result<Self> {
        config.validate()?;

        let users = config
            .users
            .iter()
            .map(|u| {
                (
                    u.id,
                    UserRecord {
                        location_mode: u.location_mode,
                        profiles: u.profiles.clone(),
                    },
                )
            })
            .collect();

        let packages = config
            .packages
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    PackageRecord {
                        uid: p.uid,
                        target_sdk: p.target_sdk,
                        permissions: p.permissions.clone(),
                        op_mode: p.op_mode,
                    },
                )
            })
            .collect();

        Ok(Self {
            state: RwLock::new(DeviceState {
                current_user: config.current_user,
                users,
                packages,
                foreground: config.foreground,
                coarse_op_wired: config.coarse_op_wired,
                calling_uid: None,
                noted_ops: Vec::new(),
            }),
        })
    }

    /// Export the current state as a device description. Noted ops and
    /// the calling identity are transient and not part of the export.
    pub fn to_config(&self) -> DeviceConfig {
        let state = self.state.read();
        DeviceConfig {
            current_user: state.current_user,
            users: state
                .users
                .iter()
                .map(|(id, u)| UserConfig {
                    id: *id,
                    location_mode: u.location_mode,
                    profiles: u.profiles.clone(),
                })
                .collect(),
            packages: state
                .packages
                .iter()
                .map(|(name, p)| PackageConfig {
                    name: name.clone(),
                    uid: p.uid,
                    target_sdk: p.target_sdk,
                    permissions: p.permissions.clone(),
                    op_mode: p.op_mode,
                })
                .collect(),
            foreground: state.foreground.clone(),
            coarse_op_wired: state.coarse_op_wired,
        }
    }

    /// Establish or clear the ambient calling identity for subsequent
    /// permission and cross-user checks.
    pub fn set_calling_uid(&self, uid: Option<Uid>) {
        self.state.write().calling_uid = uid;
    }

    /// Change a user's location mode setting.
    pub fn set_location_mode(&self, user: UserId, mode: LocationMode) -> Result<()> {
        let mut state = self.state.write();
        match state.users.get_mut(&user) {
            Some(record) => {
                debug!(%user, ?mode, "location mode changed");
                record.location_mode = mode;
                Ok(())
            }
            None => Err(CellGateError::Config(format!("unknown user: {}", user))),
        }
    }

    /// Change the foreground-most task owner.
    pub fn set_foreground(&self, package: Option<&str>) {
        self.state.write().foreground = package.map(str::to_string);
    }

    /// Switch the active user.
    pub fn switch_user(&self, user: UserId) -> Result<()> {
        let mut state = self.state.write();
        if !state.users.contains_key(&user) {
            return Err(CellGateError::Config(format!("unknown user: {}", user)));
        }
        debug!(from = %state.current_user, to = %user, "switching current user");
        state.current_user = user;
        Ok(())
    }

    /// Grant a manifest permission to a package.
    pub fn grant(&self, package: &str, permission: &str) -> Result<()> {
        let mut state = self.state.write();
        let record = state
            .packages
            .get_mut(package)
            .ok_or_else(|| CellGateError::Config(format!("unknown package: {}", package)))?;
        if !record.permissions.iter().any(|p| p == permission) {
            record.permissions.push(permission.to_string());
        }
        Ok(())
    }

    /// Revoke a manifest permission from a package.
    pub fn revoke(&self, package: &str, permission: &str) -> Result<()> {
        let mut state = self.state.write();
        let record = state
            .packages
            .get_mut(package)
            .ok_or_else(|| CellGateError::Config(format!("unknown package: {}", package)))?;
        record.permissions.retain(|p| p != permission);
        Ok(())
    }

    /// Change a package's runtime op mode.
    pub fn set_op_mode(&self, package: &str, mode: OpMode) -> Result<()> {
        let mut state = self.state.write();
        let record = state
            .packages
            .get_mut(package)
            .ok_or_else(|| CellGateError::Config(format!("unknown package: {}", package)))?;
        record.op_mode = mode;
        Ok(())
    }

    /// Snapshot of the app-ops accounting history.
    pub fn noted_ops(&self) -> Vec<NotedOp> {
        self.state.read().noted_ops.clone()
    }
}

impl PackageOpsValidator for SimulatedPlatform {
    fn check_package(&self, uid: Uid, package: &str) -> Result<()> {
        let state = self.state.read();
        match state.packages.get(package) {
            Some(record) if record.uid == uid => Ok(()),
            Some(record) => Err(CellGateError::InvalidCaller(format!(
                "package {} belongs to uid {}, not {}",
                package, record.uid, uid
            ))),
            None => Err(CellGateError::InvalidCaller(format!(
                "package {} is not installed",
                package
            ))),
        }
    }
}

impl PermissionEnforcer for SimulatedPlatform {
    fn enforce_calling_permission(&self, permission: &str, message: &str) -> Result<()> {
        let state = self.state.read();
        let Some(uid) = state.calling_uid else {
            warn!(permission, "permission check without a calling identity");
            return Err(CellGateError::PermissionMissing(format!(
                "{} required: {}",
                permission, message
            )));
        };
        if state.uid_holds(uid, permission) {
            Ok(())
        } else {
            Err(CellGateError::PermissionMissing(format!(
                "{} required: {}",
                permission, message
            )))
        }
    }
}

impl AppOpsTracker for SimulatedPlatform {
    fn permission_to_op_code(&self, permission: &str) -> Option<OpCode> {
        let state = self.state.read();
        if !state.coarse_op_wired {
            return None;
        }
        match permission {
            ACCESS_COARSE_LOCATION => Some(OpCode::CoarseLocation),
            ACCESS_FINE_LOCATION => Some(OpCode::FineLocation),
            _ => None,
        }
    }

    fn note_op(&self, op: OpCode, uid: Uid, package: &str) -> OpMode {
        let mut state = self.state.write();
        state.noted_ops.push(NotedOp {
            op,
            uid,
            package: package.to_string(),
            at: Utc::now(),
        });

        match state.packages.get(package) {
            Some(record) if record.uid == uid => record.op_mode,
            Some(_) | None => {
                warn!(package, %uid, "note for an unknown binding");
                OpMode::Errored
            }
        }
    }
}

impl LocationModeProvider for SimulatedPlatform {
    fn location_mode(&self, user: UserId) -> LocationMode {
        let state = self.state.read();
        match state.users.get(&user) {
            Some(record) => record.location_mode,
            None => {
                // Unknown users read as off, the stricter state.
                warn!(%user, "location mode query for unknown user");
                LocationMode::Off
            }
        }
    }
}

impl PackageInfoOracle for SimulatedPlatform {
    fn target_sdk_version(&self, package: &str) -> std::result::Result<u32, PackageNotFound> {
        let state = self.state.read();
        state
            .packages
            .get(package)
            .map(|record| record.target_sdk)
            .ok_or_else(|| PackageNotFound(package.to_string()))
    }
}

impl ForegroundAppOracle for SimulatedPlatform {
    fn top_task_package(&self) -> Option<String> {
        self.state.read().foreground.clone()
    }
}

impl UserStateOracle for SimulatedPlatform {
    fn current_user(&self) -> UserId {
        self.state.read().current_user
    }

    fn profile_group(&self, user: UserId) -> Vec<UserId> {
        let state = self.state.read();
        let mut group = vec![user];
        if let Some(record) = state.users.get(&user) {
            for profile in &record.profiles {
                if !group.contains(profile) {
                    group.push(*profile);
                }
            }
        }
        group
    }
}

impl CrossUserChecker for SimulatedPlatform {
    fn has_interact_across_users_full(&self) -> bool {
        let state = self.state.read();
        state
            .calling_uid
            .map(|uid| state.uid_holds(uid, INTERACT_ACROSS_USERS_FULL))
            .unwrap_or(false)
    }
}
