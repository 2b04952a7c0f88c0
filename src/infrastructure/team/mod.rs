//! Team infrastructure implementations

mod handler;
mod in_memory;
mod postgres;

pub use handler::{CreateTeamRequest, TeamCreationHandler, TEAM_URL_TAKEN};
pub use in_memory::InMemoryTeamRepository;
pub use postgres::PostgresTeamRepository;
