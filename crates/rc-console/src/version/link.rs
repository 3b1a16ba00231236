//! Audit-trail deep links
//!
//! Any audited record can point at its own history: the link carries the
//! explicit-entity navigation parameters the audit-trail endpoint reads.

use super::entity::EntityRef;
use crate::app::entity::{App, AppGrant, Identity};
use crate::user::entity::User;

pub const AUDIT_TRAIL_PATH: &str = "/api/admin/audit-trail";

/// A record whose changes are versioned
pub trait Auditable {
    /// Type name stored in `itemType` / `parentClass` / `coparentClass`
    fn audit_type(&self) -> &'static str;

    fn audit_id(&self) -> i64;

    fn audit_ref(&self) -> EntityRef {
        EntityRef::new(self.audit_type(), self.audit_id())
    }
}

impl Auditable for App {
    fn audit_type(&self) -> &'static str { "App" }
    fn audit_id(&self) -> i64 { self.id }
}

impl Auditable for AppGrant {
    fn audit_type(&self) -> &'static str { "AppGrant" }
    fn audit_id(&self) -> i64 { self.id }
}

impl Auditable for Identity {
    fn audit_type(&self) -> &'static str { "Identity" }
    fn audit_id(&self) -> i64 { self.id }
}

impl Auditable for User {
    fn audit_type(&self) -> &'static str { "User" }
    fn audit_id(&self) -> i64 { self.id }
}

/// `/api/admin/audit-trail?class=<Type>&id=<id>`
pub fn audit_trail_link(entity: &EntityRef) -> String {
    format!(
        "{}?class={}&id={}",
        AUDIT_TRAIL_PATH,
        urlencoding::encode(&entity.entity_type),
        entity.id
    )
}

pub fn audit_trail_link_for(record: &impl Auditable) -> String {
    audit_trail_link(&record.audit_ref())
}
