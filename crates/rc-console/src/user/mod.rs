//! User Aggregate
//!
//! Human users, looked up by email when resolving audit-trail actors.

pub mod entity;
pub mod repository;

pub use entity::User;
pub use repository::{UserDirectory, UserRepository};
