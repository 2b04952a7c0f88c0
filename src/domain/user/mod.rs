//! User domain
//!
//! Users are owned by an external account system. This crate only sees the
//! authenticated caller of an operation.

mod entity;

pub use entity::{AuthenticatedUser, UserId};
