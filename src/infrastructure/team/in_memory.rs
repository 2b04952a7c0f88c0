//! In-memory team repository

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::team::{NewTeam, SlugScope, Team, TeamId, TeamRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct TeamTable {
    teams: BTreeMap<TeamId, Team>,
    next_id: i64,
}

/// Thread-safe in-memory team repository
///
/// Useful for testing and development. Data is lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    table: RwLock<TeamTable>,
}

impl InMemoryTeamRepository {
    /// Creates a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with teams
    pub fn with_teams(teams: Vec<Team>) -> Self {
        let next_id = teams.iter().map(|t| t.id.value()).max().unwrap_or(0);
        let teams = teams.into_iter().map(|t| (t.id, t)).collect();

        Self {
            table: RwLock::new(TeamTable { teams, next_id }),
        }
    }

    /// Number of stored teams
    pub fn len(&self) -> Result<usize, DomainError> {
        Ok(self.read()?.teams.len())
    }

    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, TeamTable>, DomainError> {
        self.table
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, TeamTable>, DomainError> {
        self.table
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn find_by_id(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        Ok(self.read()?.teams.get(&id).cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        scope: SlugScope,
    ) -> Result<Option<Team>, DomainError> {
        let table = self.read()?;

        Ok(table
            .teams
            .values()
            .find(|t| t.slug.as_deref() == Some(slug) && t.in_scope(scope))
            .cloned())
    }

    async fn find_requested_by_member(
        &self,
        user_id: UserId,
        slug: &str,
    ) -> Result<Option<Team>, DomainError> {
        let table = self.read()?;

        Ok(table
            .teams
            .values()
            .find(|t| t.is_member(user_id) && t.requested_slug() == Some(slug))
            .cloned())
    }

    async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
        let mut table = self.write()?;

        // Mirrors the unique (parent_id, slug) constraint of the SQL schema
        if let Some(slug) = team.slug.as_deref() {
            let taken = table
                .teams
                .values()
                .any(|t| t.slug.as_deref() == Some(slug) && t.parent_id == team.parent_id);

            if taken {
                return Err(DomainError::conflict(format!(
                    "Team slug '{}' already exists",
                    slug
                )));
            }
        }

        table.next_id += 1;
        let id = TeamId::new(table.next_id);
        let created = team.into_team(id, Utc::now());

        table.teams.insert(id, created.clone());
        Ok(created)
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.read().map(|_| ())
    }
}
