//! Team validation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team slug cannot be empty")]
    EmptySlug,

    #[error("Team slug can only contain lowercase letters, digits and single hyphens")]
    InvalidSlugCharacters,

    #[error("Team name cannot be empty")]
    EmptyName,
}

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid slug pattern"));

static NON_SLUG_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator pattern"));

/// Validate a team slug
pub fn validate_team_slug(slug: &str) -> Result<(), TeamValidationError> {
    if slug.is_empty() {
        return Err(TeamValidationError::EmptySlug);
    }

    if !SLUG_PATTERN.is_match(slug) {
        return Err(TeamValidationError::InvalidSlugCharacters);
    }

    Ok(())
}

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    Ok(())
}

/// Normalise free-form input into a slug.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single hyphen and trims hyphens from both ends.
pub fn slugify(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    NON_SLUG_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
