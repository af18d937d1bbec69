//! Account and region model.
//!
//! Accounts namespace the snapshot store; regions belong to exactly one
//! account and are enumerated per account by a [`crate::store::RegionDirectory`].

use serde::{Deserialize, Serialize};

/// An account as it appears in reports: identifier plus display name.
///
/// The display name is what the snapshot store uses as its directory key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Region descriptor as returned by the region directory (`describe-regions`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    #[serde(rename = "RegionName")]
    pub region_name: String,
    #[serde(rename = "Endpoint", default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl RegionDescriptor {
    pub fn new(region_name: impl Into<String>) -> Self {
        Self { region_name: region_name.into(), endpoint: None }
    }
}

/// A region within one account. This is the unit every detector runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub account: Account,
    pub name: String,
}

impl Region {
    pub fn new(account: Account, descriptor: &RegionDescriptor) -> Self {
        Self { account, name: descriptor.region_name.clone() }
    }

    /// Build a region directly from a name; mostly for tests and ad-hoc lookups.
    pub fn named(account: Account, name: impl Into<String>) -> Self {
        Self { account, name: name.into() }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.account.name, self.name)
    }
}
