//! Caller identity types

use serde::{Deserialize, Serialize};

use crate::domain::team::TeamId;

/// User identifier assigned by the account system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The authenticated caller of an operation.
///
/// Supplied by the upstream session layer and passed explicitly into every
/// operation that needs to know who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: UserId,
    /// Team acting as the caller's organization, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            organization_id: None,
            email: None,
            name: None,
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<TeamId>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether teams created by this user are nested under an organization
    pub fn is_organization_member(&self) -> bool {
        self.organization_id.is_some()
    }
}
