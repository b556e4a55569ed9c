//! Per-call collaborator context
//!
//! The decision engine takes no constructor dependencies; everything it
//! consults arrives through an [`AccessContext`] built for one call and
//! dropped when the call returns.

use crate::traits::{
    AppOpsTracker, CrossUserChecker, ForegroundAppOracle, LocationModeProvider, PackageInfoOracle,
    PackageOpsValidator, PermissionEnforcer, UserStateOracle,
};

/// Borrowed references to every collaborator one decision consults.
pub struct AccessContext<'a> {
    pub package_ops: &'a dyn PackageOpsValidator,
    pub permissions: &'a dyn PermissionEnforcer,
    pub app_ops: &'a dyn AppOpsTracker,
    pub location_mode: &'a dyn LocationModeProvider,
    pub package_info: &'a dyn PackageInfoOracle,
    pub foreground: &'a dyn ForegroundAppOracle,
    pub users: &'a dyn UserStateOracle,
    pub cross_user: &'a dyn CrossUserChecker,
}

impl<'a> AccessContext<'a> {
    /// Builds a context from one value implementing every collaborator
    /// capability, the common case for a live platform or a full fake.
    pub fn from_platform<P>(platform: &'a P) -> Self
    where
        P: PackageOpsValidator
            + PermissionEnforcer
            + AppOpsTracker
            + LocationModeProvider
            + PackageInfoOracle
            + ForegroundAppOracle
            + UserStateOracle
            + CrossUserChecker,
    {
        Self {
            package_ops: platform,
            permissions: platform,
            app_ops: platform,
            location_mode: platform,
            package_info: platform,
            foreground: platform,
            users: platform,
            cross_user: platform,
        }
    }
}
