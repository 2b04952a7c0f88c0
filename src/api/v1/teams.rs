//! Team creation endpoint

use axum::extract::State;
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

use crate::api::middleware::CallerIdentity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::team::{slugify, Team};
use crate::infrastructure::team::CreateTeamRequest;

/// Request body for `POST /v1/teams`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTeamApiRequest {
    #[validate(length(min = 1))]
    pub slug: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl From<CreateTeamApiRequest> for CreateTeamRequest {
    fn from(request: CreateTeamApiRequest) -> Self {
        Self {
            slug: slugify(&request.slug),
            name: request.name.trim().to_string(),
            logo: request.logo.filter(|logo| !logo.trim().is_empty()),
        }
    }
}

/// POST /v1/teams
pub async fn create_team(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(request): Json<CreateTeamApiRequest>,
) -> Result<Json<Team>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    debug!(user_id = %caller.id, slug = %request.slug, "Create team request");

    let team = state
        .team_service
        .create(&caller, request.into())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(team))
}
