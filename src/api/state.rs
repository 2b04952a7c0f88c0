//! Application state for shared services

use std::sync::Arc;

use crate::domain::team::{Team, TeamRepository};
use crate::domain::user::AuthenticatedUser;
use crate::domain::DomainError;
use crate::infrastructure::team::{CreateTeamRequest, TeamCreationHandler};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub team_service: Arc<dyn TeamServiceTrait>,
}

impl AppState {
    pub fn new(team_service: Arc<dyn TeamServiceTrait>) -> Self {
        Self { team_service }
    }
}

/// Trait for team service operations
#[async_trait::async_trait]
pub trait TeamServiceTrait: Send + Sync {
    async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateTeamRequest,
    ) -> Result<Team, DomainError>;

    /// Reachability of the team store
    async fn ping(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R: TeamRepository + 'static> TeamServiceTrait for TeamCreationHandler<R> {
    async fn create(
        &self,
        caller: &AuthenticatedUser,
        request: CreateTeamRequest,
    ) -> Result<Team, DomainError> {
        TeamCreationHandler::create(self, caller, request).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        TeamCreationHandler::ping(self).await
    }
}
