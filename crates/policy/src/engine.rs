//! Location-access decision engine
//!
//! Decides whether a caller may read cell-location-derived data right
//! now. The procedure is a straight-line gate sequence evaluated in a
//! fixed order: each gate either passes, denies the call with a named
//! reason, or fails hard on the error channel. The first failing gate is
//! authoritative; later gates are never consulted.
//!
//! The engine holds no state of its own. Repeated calls with unchanged
//! collaborator state yield the same outcome, and nothing is cached
//! between calls (location mode, op modes, and the foreground task can
//! all change at any time).

use std::fmt;

use tracing::debug;

use cellgate_core::{CallerIdentity, Result, UserId};

use crate::context::AccessContext;
use crate::traits::{PackageNotFound, ACCESS_COARSE_LOCATION};

/// Highest target SDK still granted the foreground-only legacy
/// exemption (Android O).
pub const MAX_LEGACY_TARGET_SDK: u32 = 26;

/// Why a policy gate denied the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// The noted app-ops mode for the location op was not "allowed".
    AppOps,
    /// Location mode is off for the caller's user and the caller is not
    /// a legacy app in the foreground.
    LocationOffNotLegacyForeground,
    /// The caller's user is not the current profile and the caller lacks
    /// the cross-user permission.
    NotCurrentProfile,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DenialReason::AppOps => "app-ops mode",
            DenialReason::LocationOffNotLegacyForeground => {
                "location mode off and not legacy-foreground"
            }
            DenialReason::NotCurrentProfile => "not current profile, no cross-user permission",
        };
        f.write_str(text)
    }
}

/// Outcome of one policy evaluation.
///
/// Hard failures never appear here; they travel on the error channel so
/// hosts can tell a misbehaving client from a routine denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    Denied(DenialReason),
}

impl AccessOutcome {
    pub fn is_granted(self) -> bool {
        matches!(self, AccessOutcome::Granted)
    }
}

/// Stateless decision procedure over live collaborator state.
///
/// Holds no fields, so one engine value can serve any number of
/// concurrent callers without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessDecisionEngine;

impl AccessDecisionEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }

    /// Decides whether `caller` may access cell-location data right now.
    ///
    /// Outcomes:
    /// - `Ok(Granted)`: every gate passed; release the data.
    /// - `Ok(Denied(reason))`: a policy gate said no. Routine; the host
    ///   should surface "no data", not an error.
    /// - `Err(InvalidCaller)`: `(uid, package)` is not a real binding.
    /// - `Err(PermissionMissing)`: the caller holds no location
    ///   permission at all.
    pub fn can_access_cell_location(
        &self,
        ctx: &AccessContext<'_>,
        caller: &CallerIdentity,
        audit_message: &str,
    ) -> Result<AccessOutcome> {
        // Gate 1: the caller must be who it claims to be.
        ctx.package_ops.check_package(caller.uid, &caller.package)?;

        // Gate 2: coarse location permission, enforced. Fine implies
        // coarse in the platform permission model, so coarse is the only
        // permission checked here.
        ctx.permissions
            .enforce_calling_permission(ACCESS_COARSE_LOCATION, audit_message)?;

        // Gate 3: runtime op accounting. A permission with no op code has
        // no runtime enforcement wired on this build; skip the note and
        // continue. Otherwise the note must happen exactly once, and only
        // now that gates 1-2 have passed.
        if let Some(op) = ctx.app_ops.permission_to_op_code(ACCESS_COARSE_LOCATION) {
            let mode = ctx.app_ops.note_op(op, caller.uid, &caller.package);
            if !mode.is_allowed() {
                debug!(
                    package = %caller.package,
                    uid = %caller.uid,
                    ?mode,
                    "app-ops mode denies location access"
                );
                return Ok(AccessOutcome::Denied(DenialReason::AppOps));
            }
        }

        // Gate 4: location mode for the caller's user, or the legacy
        // foreground exemption. The exemption is only computed when the
        // mode check fails.
        let user = ctx.users.user_id_from_uid(caller.uid);
        if !ctx.location_mode.location_mode(user).is_enabled()
            && !self.is_legacy_foreground(ctx, &caller.package)
        {
            debug!(
                package = %caller.package,
                %user,
                "location mode off, caller not legacy-foreground"
            );
            return Ok(AccessOutcome::Denied(
                DenialReason::LocationOffNotLegacyForeground,
            ));
        }

        // Gate 5: cross-user visibility. The cross-user permission is
        // only consulted when the profile check fails.
        if !self.is_current_profile(ctx, user) && !ctx.cross_user.has_interact_across_users_full() {
            debug!(
                package = %caller.package,
                %user,
                "caller user is not the current profile"
            );
            return Ok(AccessOutcome::Denied(DenialReason::NotCurrentProfile));
        }

        debug!(
            package = %caller.package,
            uid = %caller.uid,
            message = audit_message,
            "cell location access granted"
        );
        Ok(AccessOutcome::Granted)
    }

    /// Target SDK at or below the legacy threshold, and currently the
    /// owner of the foreground-most task.
    fn is_legacy_foreground(&self, ctx: &AccessContext<'_>, package: &str) -> bool {
        self.is_legacy_app(ctx, package) && self.is_foreground_app(ctx, package)
    }

    fn is_legacy_app(&self, ctx: &AccessContext<'_>, package: &str) -> bool {
        match ctx.package_info.target_sdk_version(package) {
            Ok(target_sdk) => target_sdk <= MAX_LEGACY_TARGET_SDK,
            // Gate 1 already validated the package, so a miss here is a
            // stale registry at worst; take the stricter non-legacy
            // branch.
            Err(PackageNotFound(_)) => false,
        }
    }

    fn is_foreground_app(&self, ctx: &AccessContext<'_>, package: &str) -> bool {
        ctx.foreground
            .top_task_package()
            .map(|top| top == package)
            .unwrap_or(false)
    }

    fn is_current_profile(&self, ctx: &AccessContext<'_>, user: UserId) -> bool {
        let current = ctx.users.current_user();
        if user == current {
            return true;
        }
        ctx.users.profile_group(current).contains(&user)
    }
}
