//! HTTP CRM client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::crm::{CrmSync, CrmSyncEvent};
use crate::domain::team::MembershipRole;
use crate::domain::DomainError;

/// Connection settings for the CRM API
#[derive(Debug, Clone)]
pub struct HttpCrmConfig {
    /// Base URL, e.g. `https://crm.example.com/api`
    pub base_url: String,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamUserPayload<'a> {
    team: TeamPayload<'a>,
    user: UserPayload<'a>,
    role: MembershipRole,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamPayload<'a> {
    id: i64,
    name: &'a str,
    slug: Option<&'a str>,
    requested_slug: Option<&'a str>,
    parent_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct UserPayload<'a> {
    id: i64,
    email: Option<&'a str>,
    name: Option<&'a str>,
}

impl<'a> From<&'a CrmSyncEvent> for TeamUserPayload<'a> {
    fn from(event: &'a CrmSyncEvent) -> Self {
        Self {
            team: TeamPayload {
                id: event.team.id.value(),
                name: &event.team.name,
                slug: event.team.slug.as_deref(),
                requested_slug: event.team.requested_slug(),
                parent_id: event.team.parent_id.map(|id| id.value()),
            },
            user: UserPayload {
                id: event.user.id.value(),
                email: event.user.email.as_deref(),
                name: event.user.name.as_deref(),
            },
            role: event.role,
        }
    }
}

/// Upserts team users through the CRM's REST API
#[derive(Debug, Clone)]
pub struct HttpCrmSync {
    client: Client,
    config: HttpCrmConfig,
}

impl HttpCrmSync {
    pub fn new(config: HttpCrmConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build CRM client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/team-users", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CrmSync for HttpCrmSync {
    async fn upsert_team_user(&self, event: &CrmSyncEvent) -> Result<(), DomainError> {
        let mut request = self
            .client
            .post(self.endpoint())
            .json(&TeamUserPayload::from(event));

        if let Some(ref api_key) = self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::internal("CRM request timed out")
            } else {
                DomainError::internal(format!("CRM request failed: {}", e))
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(500)
                .collect();

            return Err(DomainError::internal(format!(
                "CRM responded with HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        Ok(())
    }
}
