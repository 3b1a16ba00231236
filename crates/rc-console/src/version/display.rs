//! Audit-trail display columns
//!
//! Each column is a pure function from a version to its display string,
//! registered in a fixed table.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::entity::{EntityRef, Version, VersionEvent};
use super::link::audit_trail_link;

pub const CREATED_AT_FORMAT: &str = "%d/%m/%Y %kh%M:%S:%3f";

/// Shown for changes with no recorded actor
pub const SYSTEM_ACTOR: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisplayField {
    Link,
    Event,
    ItemType,
    ItemId,
    ParentLink,
    ParentClassAndId,
    CoparentLink,
    CoparentClassAndId,
    Whodunnit,
    Source,
    JobName,
    CreatedAt,
    ObjectChanges,
}

pub type Extractor = fn(&Version) -> String;

/// Columns in display order
pub const COLUMNS: &[(DisplayField, Extractor)] = &[
    (DisplayField::Link, link),
    (DisplayField::Event, |v| v.event.as_str().to_string()),
    (DisplayField::ItemType, |v| v.item_type.clone()),
    (DisplayField::ItemId, |v| v.item_id.to_string()),
    (DisplayField::ParentLink, |v| entity_link(v.parent())),
    (DisplayField::ParentClassAndId, |v| class_and_id(v.parent())),
    (DisplayField::CoparentLink, |v| entity_link(v.coparent())),
    (DisplayField::CoparentClassAndId, |v| class_and_id(v.coparent())),
    (DisplayField::Whodunnit, whodunnit),
    (DisplayField::Source, |v| v.source.clone().unwrap_or_default()),
    (DisplayField::JobName, |v| v.job_name.clone().unwrap_or_default()),
    (DisplayField::CreatedAt, |v| v.created_at.format(CREATED_AT_FORMAT).to_string()),
    (DisplayField::ObjectChanges, object_changes),
];

impl DisplayField {
    pub fn extract(self, version: &Version) -> String {
        COLUMNS.iter()
            .find(|(field, _)| *field == self)
            .map(|(_, extractor)| extractor(version))
            .unwrap_or_default()
    }
}

/// Every column of one version
pub fn display_row(version: &Version) -> BTreeMap<DisplayField, String> {
    COLUMNS.iter()
        .map(|(field, extractor)| (*field, extractor(version)))
        .collect()
}

fn link(version: &Version) -> String {
    if version.event == VersionEvent::Destroy {
        "Deleted".to_string()
    } else {
        version.subject().to_string()
    }
}

fn entity_link(entity: Option<EntityRef>) -> String {
    entity.map(|e| audit_trail_link(&e)).unwrap_or_default()
}

fn class_and_id(entity: Option<EntityRef>) -> String {
    entity.map(|e| e.to_string()).unwrap_or_default()
}

fn whodunnit(version: &Version) -> String {
    match version.whodunnit.as_deref().map(str::trim) {
        Some(actor) if !actor.is_empty() => actor.to_string(),
        _ => SYSTEM_ACTOR.to_string(),
    }
}

fn object_changes(version: &Version) -> String {
    version.object_changes.iter()
        .map(|(field, change)| format!("{}: {} -> {}", field, plain(&change.0), plain(&change.1)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn plain(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
