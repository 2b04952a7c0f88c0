//! CRM sync domain
//!
//! After a team is created, the creator and the team are pushed to an
//! external CRM. Delivery happens off the request path: operations hand an
//! event to a [`CrmNotifier`] and move on, and a [`CrmSync`] implementation
//! performs the actual I/O later.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::team::{MembershipRole, Team};
use crate::domain::user::AuthenticatedUser;
use crate::domain::DomainError;

/// A team member that should be mirrored into the CRM
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrmSyncEvent {
    pub team: Team,
    pub user: AuthenticatedUser,
    pub role: MembershipRole,
}

impl CrmSyncEvent {
    pub fn new(team: Team, user: AuthenticatedUser, role: MembershipRole) -> Self {
        Self { team, user, role }
    }
}

/// Performs the upsert against the CRM
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmSync: Send + Sync {
    async fn upsert_team_user(&self, event: &CrmSyncEvent) -> Result<(), DomainError>;
}

/// Accepts sync events without blocking the caller.
///
/// Implementations own their error policy; nothing is reported back.
pub trait CrmNotifier: Send + Sync {
    fn notify(&self, event: CrmSyncEvent);
}
