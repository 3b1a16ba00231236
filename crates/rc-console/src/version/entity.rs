//! Version Entity
//!
//! One immutable audit record: a create, update or destroy of a tracked
//! record, with the actor, origin and field-level diff.

use std::collections::BTreeMap;
use std::fmt;

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of change recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VersionEvent {
    Create,
    Update,
    Destroy,
}

impl VersionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "destroy" => Some(Self::Destroy),
            _ => None,
        }
    }
}

/// `[before, after]` pair for one changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldChange(pub serde_json::Value, pub serde_json::Value);

/// A typed reference to a record: `(type name, numeric id)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_type: String,
    pub id: i64,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>, id: i64) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.entity_type, self.id)
    }
}

/// Audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    /// Monotonic sequence id
    #[serde(rename = "_id")]
    pub id: i64,

    pub event: VersionEvent,

    pub item_type: String,

    pub item_id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coparent_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coparent_id: Option<i64>,

    /// Actor: user actor id, app client id, or blank for system changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whodunnit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,

    #[serde(default)]
    pub object_changes: BTreeMap<String, FieldChange>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Version {
    pub fn new(id: i64, event: VersionEvent, item_type: impl Into<String>, item_id: i64) -> Self {
        Self {
            id,
            event,
            item_type: item_type.into(),
            item_id,
            parent_class: None,
            parent_id: None,
            coparent_class: None,
            coparent_id: None,
            whodunnit: None,
            source: None,
            job_name: None,
            object_changes: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_parent(mut self, class: impl Into<String>, id: i64) -> Self {
        self.parent_class = Some(class.into());
        self.parent_id = Some(id);
        self
    }

    pub fn with_coparent(mut self, class: impl Into<String>, id: i64) -> Self {
        self.coparent_class = Some(class.into());
        self.coparent_id = Some(id);
        self
    }

    pub fn with_whodunnit(mut self, whodunnit: impl Into<String>) -> Self {
        self.whodunnit = Some(whodunnit.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_change(
        mut self,
        field: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        self.object_changes.insert(field.into(), FieldChange(before, after));
        self
    }

    pub fn subject(&self) -> EntityRef {
        EntityRef::new(self.item_type.clone(), self.item_id)
    }

    pub fn parent(&self) -> Option<EntityRef> {
        match (&self.parent_class, self.parent_id) {
            (Some(class), Some(id)) => Some(EntityRef::new(class.clone(), id)),
            _ => None,
        }
    }

    pub fn coparent(&self) -> Option<EntityRef> {
        match (&self.coparent_class, self.coparent_id) {
            (Some(class), Some(id)) => Some(EntityRef::new(class.clone(), id)),
            _ => None,
        }
    }

    /// True when the record's subject, parent or co-parent is `entity`
    pub fn concerns(&self, entity: &EntityRef) -> bool {
        self.subject() == *entity
            || self.parent().as_ref() == Some(entity)
            || self.coparent().as_ref() == Some(entity)
    }
}
