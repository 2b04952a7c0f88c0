//! Team domain module
//!
//! Teams are the primary organizational unit. A team may be nested under
//! another team acting as an organization.

mod entity;
mod membership;
mod repository;
mod validation;

pub use entity::{NewTeam, SlugScope, Team, TeamId, TeamMetadata};
pub use membership::{Membership, MembershipRole};
pub use repository::TeamRepository;
pub use validation::{slugify, validate_team_name, validate_team_slug, TeamValidationError};
