//! PostgreSQL team repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::team::{
    Membership, MembershipRole, NewTeam, SlugScope, Team, TeamId, TeamMetadata, TeamRepository,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const TEAM_COLUMNS: &str = "id, name, slug, logo, parent_id, metadata, created_at";

/// PostgreSQL implementation of TeamRepository
///
/// Expects a `teams` table and a `memberships` table keyed by
/// `(team_id, user_id)`; slug uniqueness is enforced by partial unique
/// indexes on `(slug) WHERE parent_id IS NULL` and `(parent_id, slug)`.
#[derive(Debug, Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_members(&self, team_id: TeamId) -> Result<Vec<Membership>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT team_id, user_id, role, accepted
            FROM memberships
            WHERE team_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(team_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load memberships: {}", e)))?;

        rows.iter().map(row_to_membership).collect()
    }

    async fn hydrate(&self, row: Option<PgRow>) -> Result<Option<Team>, DomainError> {
        match row {
            Some(row) => {
                let mut team = row_to_team(&row)?;
                team.members = self.load_members(team.id).await?;
                Ok(Some(team))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn find_by_id(&self, id: TeamId) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM teams WHERE id = $1", TEAM_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get team: {}", e)))?;

        self.hydrate(row).await
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        scope: SlugScope,
    ) -> Result<Option<Team>, DomainError> {
        let row = match scope {
            SlugScope::Global => {
                sqlx::query(&format!(
                    "SELECT {} FROM teams WHERE slug = $1 ORDER BY id LIMIT 1",
                    TEAM_COLUMNS
                ))
                .bind(slug)
                .fetch_optional(&self.pool)
                .await
            }
            SlugScope::Children(parent_id) => {
                sqlx::query(&format!(
                    "SELECT {} FROM teams WHERE slug = $1 AND parent_id = $2 ORDER BY id LIMIT 1",
                    TEAM_COLUMNS
                ))
                .bind(slug)
                .bind(parent_id.value())
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(|e| DomainError::storage(format!("Failed to get team by slug: {}", e)))?;

        self.hydrate(row).await
    }

    async fn find_requested_by_member(
        &self,
        user_id: UserId,
        slug: &str,
    ) -> Result<Option<Team>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM teams t
            WHERE t.metadata ->> 'requestedSlug' = $2
              AND EXISTS (
                  SELECT 1 FROM memberships m
                  WHERE m.team_id = t.id AND m.user_id = $1
              )
            ORDER BY t.id
            LIMIT 1
            "#,
            TEAM_COLUMNS
        ))
        .bind(user_id.value())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get requested team: {}", e)))?;

        self.hydrate(row).await
    }

    async fn create(&self, team: NewTeam) -> Result<Team, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let row = sqlx::query(
            r#"
            INSERT INTO teams (name, slug, logo, parent_id, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(&team.name)
        .bind(team.slug.as_deref())
        .bind(team.logo.as_deref())
        .bind(team.parent_id.map(|id| id.value()))
        .bind(Json(&team.metadata))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());

            if unique_violation {
                DomainError::conflict(format!(
                    "Team slug '{}' already exists",
                    team.slug.as_deref().unwrap_or_default()
                ))
            } else {
                DomainError::storage(format!("Failed to create team: {}", e))
            }
        })?;

        let id = TeamId::new(get_column(&row, "id")?);
        let created_at: DateTime<Utc> = get_column(&row, "created_at")?;

        sqlx::query(
            r#"
            INSERT INTO memberships (team_id, user_id, role, accepted)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id.value())
        .bind(team.owner_id.value())
        .bind(MembershipRole::Owner.as_str())
        .bind(true)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create owner membership: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit team: {}", e)))?;

        Ok(team.into_team(id, created_at))
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }
}

fn get_column<'r, T>(row: &'r PgRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| DomainError::storage(format!("Invalid column '{}': {}", column, e)))
}

fn row_to_team(row: &PgRow) -> Result<Team, DomainError> {
    let metadata: Json<TeamMetadata> = get_column(row, "metadata")?;
    let parent_id: Option<i64> = get_column(row, "parent_id")?;

    Ok(Team {
        id: TeamId::new(get_column(row, "id")?),
        name: get_column(row, "name")?,
        slug: get_column(row, "slug")?,
        logo: get_column(row, "logo")?,
        parent_id: parent_id.map(TeamId::new),
        metadata: metadata.0,
        members: Vec::new(),
        created_at: get_column(row, "created_at")?,
    })
}

fn row_to_membership(row: &PgRow) -> Result<Membership, DomainError> {
    let role: String = get_column(row, "role")?;
    let role = parse_role(&role)?;

    Ok(Membership::new(
        UserId::new(get_column(row, "user_id")?),
        TeamId::new(get_column(row, "team_id")?),
        role,
        get_column(row, "accepted")?,
    ))
}

fn parse_role(role: &str) -> Result<MembershipRole, DomainError> {
    role.parse::<MembershipRole>()
        .map_err(|e| DomainError::storage(format!("Invalid membership in database: {}", e)))
}
