//! CRM sync that only logs

use async_trait::async_trait;
use tracing::debug;

use crate::domain::crm::{CrmSync, CrmSyncEvent};
use crate::domain::DomainError;

/// Used when no CRM integration is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCrmSync;

#[async_trait]
impl CrmSync for NoopCrmSync {
    async fn upsert_team_user(&self, event: &CrmSyncEvent) -> Result<(), DomainError> {
        debug!(
            team_id = %event.team.id,
            user_id = %event.user.id,
            role = %event.role,
            "CRM sync disabled, skipping team user upsert"
        );
        Ok(())
    }
}
