//! Error types for CellGate
//!
//! Centralized error handling using thiserror.
//!
//! The decision procedure distinguishes two hard-failure kinds from the
//! ordinary policy denials it returns as values: a caller whose
//! `(uid, package)` pair is not a real binding, and a caller that holds no
//! location permission at all. Both travel on the error channel and must
//! never be downgraded to a denial.

use thiserror::Error;

/// Main error type for CellGate
#[derive(Error, Debug)]
pub enum CellGateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The supplied `(uid, package)` pair does not correspond to a real,
    /// currently-installed app binding. A malformed or stale call, not a
    /// security denial.
    #[error("Invalid caller: {0}")]
    InvalidCaller(String),

    /// The calling identity holds none of the required location
    /// permissions. The caller should never have been allowed to make the
    /// request in the first place.
    #[error("Missing permission: {0}")]
    PermissionMissing(String),

    #[error("Scenario error: {0}")]
    Scenario(String),
}

/// Result type alias for CellGate operations
pub type Result<T> = std::result::Result<T, CellGateError>;

impl CellGateError {
    /// True for the two decision hard failures, which hosts typically log
    /// against the misbehaving client rather than retry.
    pub fn is_security_fault(&self) -> bool {
        matches!(
            self,
            CellGateError::InvalidCaller(_) | CellGateError::PermissionMissing(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_fault_classification() {
        assert!(CellGateError::InvalidCaller("uid 42 != com.example".into()).is_security_fault());
        assert!(CellGateError::PermissionMissing("coarse location".into()).is_security_fault());
        assert!(!CellGateError::Config("bad device file".into()).is_security_fault());
        assert!(!CellGateError::Scenario("no requests".into()).is_security_fault());
    }
}
