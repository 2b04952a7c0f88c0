//! Team entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::membership::{Membership, MembershipRole};
use crate::domain::user::UserId;

/// Team identifier assigned by storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(i64);

impl TeamId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TeamId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-form team metadata.
///
/// Only `requestedSlug` is interpreted here; every other key is carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMetadata {
    /// Slug the creator asked for, staged until billing activates the team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_slug: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeamMetadata {
    pub fn with_requested_slug(slug: impl Into<String>) -> Self {
        Self {
            requested_slug: Some(slug.into()),
            extra: Map::new(),
        }
    }
}

/// Where a slug has to be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugScope {
    /// Any team, nested or not
    Global,
    /// Teams sharing the given parent organization
    Children(TeamId),
}

/// Team entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Unset while the team waits for billing activation
    pub slug: Option<String>,
    pub logo: Option<String>,
    /// Organization this team is nested under
    pub parent_id: Option<TeamId>,
    pub metadata: TeamMetadata,
    pub members: Vec<Membership>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub fn requested_slug(&self) -> Option<&str> {
        self.metadata.requested_slug.as_deref()
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }

    /// Whether the team sits inside the given slug scope
    pub fn in_scope(&self, scope: SlugScope) -> bool {
        match scope {
            SlugScope::Global => true,
            SlugScope::Children(parent) => self.parent_id == Some(parent),
        }
    }

    /// Whether `user_id` may create child teams under this organization.
    ///
    /// The caller must own the organization, or the organization must have
    /// at least one admin membership (any user).
    pub fn permits_child_teams_for(&self, user_id: UserId) -> bool {
        self.members.iter().any(|m| {
            (m.user_id == user_id && m.role == MembershipRole::Owner)
                || m.role == MembershipRole::Admin
        })
    }
}

/// A team that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTeam {
    pub name: String,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub parent_id: Option<TeamId>,
    pub metadata: TeamMetadata,
    /// Creator, stored as an accepted owner membership
    pub owner_id: UserId,
}

impl NewTeam {
    /// Materialize the team once storage has assigned an id
    pub fn into_team(self, id: TeamId, created_at: DateTime<Utc>) -> Team {
        let owner = Membership::owner(self.owner_id, id);

        Team {
            id,
            name: self.name,
            slug: self.slug,
            logo: self.logo,
            parent_id: self.parent_id,
            metadata: self.metadata,
            members: vec![owner],
            created_at,
        }
    }
}
