//! Status values reported by Compute resources.
//!
//! Backends define their own vocabulary of lifecycle states, so
//! [`ResourceStatus`] is an open value type rather than a closed enum. The
//! well-known Nova, volume and image states are provided as constants and
//! consumers can declare more without touching the waiter.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a cloud resource, compared case-insensitively.
///
/// Nova reports server states in upper case (`ACTIVE`) while the volume and
/// image services use lower case (`available`, `deleted`). Both spellings
/// name the same status, so equality and hashing ignore ASCII case.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ResourceStatus(Cow<'static, str>);

impl ResourceStatus {
    /// Server is running.
    pub const ACTIVE: Self = Self::from_static("ACTIVE");
    /// Server is being built.
    pub const BUILD: Self = Self::from_static("BUILD");
    /// Resource entered an error state.
    pub const ERROR: Self = Self::from_static("ERROR");
    /// Resource has been deleted but may still be visible.
    pub const DELETED: Self = Self::from_static("DELETED");
    /// Server is powered off.
    pub const SHUTOFF: Self = Self::from_static("SHUTOFF");
    /// Server is performing a soft reboot.
    pub const REBOOT: Self = Self::from_static("REBOOT");
    /// Server is performing a hard reboot.
    pub const HARD_REBOOT: Self = Self::from_static("HARD_REBOOT");
    /// Server is paused.
    pub const PAUSED: Self = Self::from_static("PAUSED");
    /// Server is suspended.
    pub const SUSPENDED: Self = Self::from_static("SUSPENDED");
    /// Volume or snapshot is ready for use.
    pub const AVAILABLE: Self = Self::from_static("AVAILABLE");
    /// Volume or snapshot is being created.
    pub const CREATING: Self = Self::from_static("CREATING");
    /// Volume or snapshot is being removed.
    pub const DELETING: Self = Self::from_static("DELETING");
    /// Volume is attached to a server.
    pub const IN_USE: Self = Self::from_static("IN-USE");
    /// Image is being uploaded from a server.
    pub const SAVING: Self = Self::from_static("SAVING");
    /// Image is reserved but has no data yet.
    pub const QUEUED: Self = Self::from_static("QUEUED");

    /// Creates a status from any string, trimming surrounding whitespace.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Cow::Owned(value.as_ref().trim().to_owned()))
    }

    /// Creates a status from a static name without allocating, suitable for
    /// `const` declarations.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the status name as reported.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ResourceStatus {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ResourceStatus {}

impl Hash for ResourceStatus {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_uppercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ResourceStatus {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.len() == value.len() {
            Self(Cow::Owned(value))
        } else {
            Self::new(trimmed)
        }
    }
}

impl From<&str> for ResourceStatus {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ResourceStatus> for String {
    fn from(value: ResourceStatus) -> Self {
        value.0.into_owned()
    }
}

impl AsRef<str> for ResourceStatus {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for ResourceStatus {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

/// Any resource snapshot that exposes a lifecycle status.
pub trait HasStatus {
    /// Status the resource reports once deleted but still retained by the
    /// backend.
    const DELETED: ResourceStatus = ResourceStatus::DELETED;

    /// Returns the status carried by this snapshot.
    fn status(&self) -> &ResourceStatus;
}

/// One or more statuses that satisfy a wait.
///
/// Equality compares membership: order and repeated members are ignored.
#[derive(Clone, Debug, Default)]
pub struct TargetStatuses(Vec<ResourceStatus>);

impl TargetStatuses {
    /// Returns `true` when `status` equals any member of the set.
    #[must_use]
    pub fn contains(&self, status: &ResourceStatus) -> bool {
        self.0.iter().any(|target| target == status)
    }

    /// Returns `true` when the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of statuses in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceStatus> {
        self.0.iter()
    }
}

impl PartialEq for TargetStatuses {
    fn eq(&self, other: &Self) -> bool {
        self.iter().all(|status| other.contains(status))
            && other.iter().all(|status| self.contains(status))
    }
}

impl Eq for TargetStatuses {}

impl fmt::Display for TargetStatuses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, status) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("|")?;
            }
            f.write_str(status.as_str())?;
        }
        Ok(())
    }
}

impl From<ResourceStatus> for TargetStatuses {
    fn from(value: ResourceStatus) -> Self {
        Self(vec![value])
    }
}

impl From<&ResourceStatus> for TargetStatuses {
    fn from(value: &ResourceStatus) -> Self {
        Self(vec![value.clone()])
    }
}

impl From<&str> for TargetStatuses {
    fn from(value: &str) -> Self {
        Self(vec![ResourceStatus::new(value)])
    }
}

impl From<Vec<ResourceStatus>> for TargetStatuses {
    fn from(value: Vec<ResourceStatus>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[ResourceStatus; N]> for TargetStatuses {
    fn from(value: [ResourceStatus; N]) -> Self {
        Self(value.into())
    }
}

impl<const N: usize> From<[&str; N]> for TargetStatuses {
    fn from(value: [&str; N]) -> Self {
        value.into_iter().map(ResourceStatus::new).collect()
    }
}

impl FromIterator<ResourceStatus> for TargetStatuses {
    fn from_iter<I: IntoIterator<Item = ResourceStatus>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
