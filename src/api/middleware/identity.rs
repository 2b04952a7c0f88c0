//! Caller identity from trusted upstream headers
//!
//! Session handling lives in the gateway in front of this service, which
//! forwards the resolved user as plain headers.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::types::ApiError;
use crate::domain::user::AuthenticatedUser;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Extractor that requires an authenticated caller
#[derive(Debug, Clone)]
pub struct CallerIdentity(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = caller_from_headers(&parts.headers)?;
        debug!(user_id = %caller.id, organization_id = ?caller.organization_id, "Resolved caller");

        Ok(CallerIdentity(caller))
    }
}

/// Build the caller from identity headers
pub fn caller_from_headers(headers: &HeaderMap) -> Result<AuthenticatedUser, ApiError> {
    let user_id = header_str(headers, USER_ID_HEADER)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?
        .parse::<i64>()
        .map_err(|_| ApiError::unauthorized("Invalid user id"))?;

    let mut caller = AuthenticatedUser::new(user_id);

    if let Some(organization_id) = header_str(headers, ORGANIZATION_ID_HEADER) {
        let organization_id = organization_id
            .parse::<i64>()
            .map_err(|_| ApiError::bad_request("Invalid organization id"))?;
        caller = caller.with_organization(organization_id);
    }

    if let Some(email) = header_str(headers, USER_EMAIL_HEADER) {
        caller = caller.with_email(email);
    }

    if let Some(name) = header_str(headers, USER_NAME_HEADER) {
        caller = caller.with_name(name);
    }

    Ok(caller)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
