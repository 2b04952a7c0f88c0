//! Domain layer - Core business logic and entities

pub mod crm;
pub mod error;
pub mod team;
pub mod user;

pub use crm::{CrmNotifier, CrmSync, CrmSyncEvent};
pub use error::DomainError;
pub use team::{
    Membership, MembershipRole, NewTeam, SlugScope, Team, TeamId, TeamMetadata, TeamRepository,
};
pub use user::{AuthenticatedUser, UserId};
