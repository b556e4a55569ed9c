//! Caller identity
//!
//! Typed identities for the process making a request and the user that
//! owns it. A caller is a `(package, uid)` pair supplied by the IPC
//! boundary; it is valid for the duration of one decision call and never
//! stored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of uids reserved for each user on the device.
pub const PER_USER_UID_RANGE: u32 = 100_000;

/// OS-level numeric identity of a calling process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Uid(pub u32);

impl Uid {
    /// User that owns this uid.
    pub fn user_id(self) -> UserId {
        UserId(self.0 / PER_USER_UID_RANGE)
    }

    /// App id within the owning user's uid range.
    pub fn app_id(self) -> u32 {
        self.0 % PER_USER_UID_RANGE
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user or one of its profiles on the device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one incoming call: the claimed package name plus the
/// process uid reported by the IPC layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Package name the caller claims to be.
    pub package: String,
    /// Process uid of the caller.
    pub uid: Uid,
}

impl CallerIdentity {
    /// Create a caller identity
    pub fn new(package: impl Into<String>, uid: Uid) -> Self {
        Self {
            package: package.into(),
            uid,
        }
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (uid {})", self.package, self.uid)
    }
}
