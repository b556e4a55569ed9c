//! CellGate Platform - simulated device state
//!
//! An in-memory platform implementing every collaborator trait the
//! decision engine consults: users and profile groups, per-user location
//! mode, the installed-package registry with permission grants and op
//! modes, and the foreground task. Loadable from a TOML device
//! description for the scenario runner, mutable between calls for tests.

pub mod config;
pub mod platform;

pub use config::{DeviceConfig, PackageConfig, UserConfig};
pub use platform::{NotedOp, SimulatedPlatform};
