//! Device Description
//!
//! Serde model of simulated platform state: users and their location
//! modes, profile topology, the installed-package registry, and the
//! foreground task. Scenario files embed one of these to describe the
//! device a request runs against.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cellgate_core::{CellGateError, Result, Uid, UserId};
use cellgate_policy::{LocationMode, OpMode};

/// One user or profile on the simulated device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// User id.
    pub id: UserId,
    /// Location mode setting for this user.
    #[serde(default = "default_location_mode")]
    pub location_mode: LocationMode,
    /// Profiles associated with this user (e.g. a work profile). The
    /// user is implicitly a member of its own profile group.
    #[serde(default)]
    pub profiles: Vec<UserId>,
}

fn default_location_mode() -> LocationMode {
    LocationMode::HighAccuracy
}

/// One installed package binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package name.
    pub name: String,
    /// Uid the package runs as.
    pub uid: Uid,
    /// Declared target SDK.
    pub target_sdk: u32,
    /// Granted manifest permissions, full names.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Runtime op mode for the location op.
    #[serde(default = "default_op_mode")]
    pub op_mode: OpMode,
}

fn default_op_mode() -> OpMode {
    OpMode::Allowed
}

/// Whole-device description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// User currently considered active.
    pub current_user: UserId,
    /// Users and profiles present on the device.
    #[serde(default)]
    pub users: Vec<UserConfig>,
    /// Installed packages.
    #[serde(default)]
    pub packages: Vec<PackageConfig>,
    /// Owning package of the foreground-most task, if any.
    #[serde(default)]
    pub foreground: Option<String>,
    /// Whether this build wires a runtime op for the coarse location
    /// permission. When false, the app-ops gate is bypassed entirely.
    #[serde(default = "default_true")]
    pub coarse_op_wired: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            current_user: UserId(0),
            users: vec![UserConfig {
                id: UserId(0),
                location_mode: LocationMode::HighAccuracy,
                profiles: Vec::new(),
            }],
            packages: Vec::new(),
            foreground: None,
            coarse_op_wired: true,
        }
    }
}

impl DeviceConfig {
    /// Load a device description from a TOML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        debug!("Loading device config from {:?}", path.as_ref());
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        let config: DeviceConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the device description to a TOML file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path.as_ref(), contents).await?;
        debug!("Device config saved to {:?}", path.as_ref());
        Ok(())
    }

    /// Look up a user entry
    pub fn user(&self, id: UserId) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Look up a package entry by name
    pub fn package(&self, name: &str) -> Option<&PackageConfig> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Reject descriptions that cannot form a coherent device.
    pub fn validate(&self) -> Result<()> {
        if self.user(self.current_user).is_none() {
            return Err(CellGateError::Config(format!(
                "current user {} has no user entry",
                self.current_user
            )));
        }

        for (i, package) in self.packages.iter().enumerate() {
            if package.name.is_empty() {
                return Err(CellGateError::Config(format!(
                    "package entry {} has an empty name",
                    i
                )));
            }
            if self
                .packages
                .iter()
                .filter(|p| p.name == package.name)
                .count()
                > 1
            {
                return Err(CellGateError::Config(format!(
                    "duplicate package entry: {}",
                    package.name
                )));
            }
        }

        for user in &self.users {
            if self.users.iter().filter(|u| u.id == user.id).count() > 1 {
                return Err(CellGateError::Config(format!(
                    "duplicate user entry: {}",
                    user.id
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DEVICE: &str = r#"
current_user = 0
foreground = "com.example.legacy"

[[users]]
id = 0
location_mode = "off"
profiles = [10]

[[users]]
id = 10

[[packages]]
name = "com.example.legacy"
uid = 10001
target_sdk = 22
permissions = ["android.permission.ACCESS_COARSE_LOCATION"]

[[packages]]
name = "com.example.modern"
uid = 10002
target_sdk = 33
permissions = ["android.permission.ACCESS_FINE_LOCATION"]
op_mode = "ignored"
"#;

    #[test]
    fn test_default_config_is_valid() {
        let config = DeviceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.current_user, UserId(0));
        assert!(config.coarse_op_wired);
    }

    #[test]
    fn test_parse_device() {
        let config: DeviceConfig = toml::from_str(SAMPLE_DEVICE).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.current_user, UserId(0));
        assert_eq!(config.foreground.as_deref(), Some("com.example.legacy"));

        let user = config.user(UserId(0)).unwrap();
        assert_eq!(user.location_mode, LocationMode::Off);
        assert_eq!(user.profiles, vec![UserId(10)]);
        // Omitted mode falls back to the default.
        assert_eq!(
            config.user(UserId(10)).unwrap().location_mode,
            LocationMode::HighAccuracy
        );

        let legacy = config.package("com.example.legacy").unwrap();
        assert_eq!(legacy.uid, Uid(10_001));
        assert_eq!(legacy.target_sdk, 22);
        assert_eq!(legacy.op_mode, OpMode::Allowed);

        let modern = config.package("com.example.modern").unwrap();
        assert_eq!(modern.op_mode, OpMode::Ignored);
    }

    #[test]
    fn test_missing_current_user_rejected() {
        let config = DeviceConfig {
            current_user: UserId(7),
            ..DeviceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CellGateError::Config(_))
        ));
    }

    #[test]
    fn test_duplicate_package_rejected() {
        let mut config: DeviceConfig = toml::from_str(SAMPLE_DEVICE).unwrap();
        let dup = config.packages[0].clone();
        config.packages.push(dup);
        assert!(matches!(config.validate(), Err(CellGateError::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config: DeviceConfig = toml::from_str(SAMPLE_DEVICE).unwrap();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let reparsed: DeviceConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(reparsed.current_user, config.current_user);
        assert_eq!(reparsed.users.len(), config.users.len());
        assert_eq!(reparsed.packages.len(), config.packages.len());
        assert_eq!(reparsed.foreground, config.foreground);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.toml");

        let config: DeviceConfig = toml::from_str(SAMPLE_DEVICE).unwrap();
        config.save(&path).await.unwrap();

        let loaded = DeviceConfig::load(&path).await.unwrap();
        assert_eq!(loaded.packages.len(), 2);
        assert_eq!(
            loaded.package("com.example.modern").unwrap().target_sdk,
            33
        );
    }
}
