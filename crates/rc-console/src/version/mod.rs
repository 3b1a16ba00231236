//! Version Aggregate
//!
//! The audit trail: immutable change records, the resolver that scopes
//! them by actor or entity, display columns and deep links.

pub mod entity;
pub mod query;
pub mod repository;
pub mod resolver;
pub mod display;
pub mod link;
pub mod api;

pub use entity::{EntityRef, FieldChange, Version, VersionEvent};
pub use query::{parse_lenient_id, VersionFilters, VersionQuery};
pub use repository::{VersionRepository, VersionStore};
pub use resolver::{AuditTrailResolver, ResolvedActor};
pub use display::{display_row, DisplayField};
pub use link::{audit_trail_link, audit_trail_link_for, Auditable};
pub use api::{audit_trail_router, AuditTrailState};
