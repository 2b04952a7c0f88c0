//! Team membership

use serde::{Deserialize, Serialize};

use super::entity::TeamId;
use crate::domain::user::UserId;

/// Role of a user within a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipRole {
    /// Team owner - full control including team deletion
    Owner,
    /// Team admin - can manage members and resources
    Admin,
    /// Regular team member
    #[default]
    Member,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }
}

impl std::fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MembershipRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            other => Err(format!("Unknown membership role '{}'", other)),
        }
    }
}

/// Link between a user and a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub user_id: UserId,
    pub team_id: TeamId,
    pub role: MembershipRole,
    pub accepted: bool,
}

impl Membership {
    pub fn new(user_id: UserId, team_id: TeamId, role: MembershipRole, accepted: bool) -> Self {
        Self {
            user_id,
            team_id,
            role,
            accepted,
        }
    }

    /// Accepted owner membership, as given to a team's creator
    pub fn owner(user_id: UserId, team_id: TeamId) -> Self {
        Self::new(user_id, team_id, MembershipRole::Owner, true)
    }
}
