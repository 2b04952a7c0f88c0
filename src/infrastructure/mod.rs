//! Infrastructure layer - Storage, CRM delivery and logging

pub mod crm;
pub mod logging;
pub mod team;
