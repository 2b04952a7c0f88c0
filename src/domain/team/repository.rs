//! Team repository trait

use async_trait::async_trait;

use super::entity::{NewTeam, SlugScope, Team, TeamId};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for teams and their memberships.
///
/// Every returned [`Team`] carries its full membership list.
#[async_trait]
pub trait TeamRepository: Send + Sync + std::fmt::Debug {
    /// Get a team by ID
    async fn find_by_id(&self, id: TeamId) -> Result<Option<Team>, DomainError>;

    /// Find a team holding `slug` within `scope`
    async fn find_by_slug(&self, slug: &str, scope: SlugScope)
    -> Result<Option<Team>, DomainError>;

    /// Find a team `user_id` belongs to whose `metadata.requestedSlug` is `slug`
    async fn find_requested_by_member(
        &self,
        user_id: UserId,
        slug: &str,
    ) -> Result<Option<Team>, DomainError>;

    /// Persist a team together with its owner membership.
    ///
    /// Fails with [`DomainError::Conflict`] when the slug is already stored
    /// in the same scope.
    async fn create(&self, team: NewTeam) -> Result<Team, DomainError>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}
