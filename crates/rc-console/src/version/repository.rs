//! Version Repository

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Collection, Database};
use tracing::debug;

use super::entity::Version;
use super::query::{VersionFilters, VersionQuery};
use crate::shared::error::Result;

/// Read access to the audit trail
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Records matching `query`, newest first (ties broken by id, highest first)
    async fn find(&self, query: &VersionQuery, skip: u64, limit: i64) -> Result<Vec<Version>>;
}

pub struct VersionRepository {
    collection: Collection<Version>,
}

impl VersionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("versions"),
        }
    }
}

#[async_trait]
impl VersionStore for VersionRepository {
    async fn find(&self, query: &VersionQuery, skip: u64, limit: i64) -> Result<Vec<Version>> {
        let options = FindOptions::builder()
            .sort(version_sort())
            .skip(skip)
            .limit(limit)
            .build();

        debug!(entity_scope = query.is_entity(), skip, limit, "Querying versions");
        let cursor = self.collection
            .find(version_filter(query))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

/// Newest first; the sequence id breaks timestamp ties
pub fn version_sort() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

/// Translate a query into a MongoDB filter document
pub fn version_filter(query: &VersionQuery) -> Document {
    match query {
        VersionQuery::Entity(entity) => doc! {
            "$or": [
                { "itemType": entity.entity_type.as_str(), "itemId": entity.id },
                { "parentClass": entity.entity_type.as_str(), "parentId": entity.id },
                { "coparentClass": entity.entity_type.as_str(), "coparentId": entity.id },
            ]
        },
        VersionQuery::Filtered(filters) => filtered_document(filters),
    }
}

fn filtered_document(filters: &VersionFilters) -> Document {
    let mut filter = doc! {};

    if let Some(whodunnit) = &filters.whodunnit {
        filter.insert("whodunnit", whodunnit.as_str());
    }
    if let Some(event) = filters.event {
        filter.insert("event", event.as_str());
    }
    if let Some(item_type) = &filters.item_type {
        filter.insert("itemType", item_type.as_str());
    }
    if let Some(item_id) = filters.item_id {
        filter.insert("itemId", item_id);
    }
    if let Some(source) = &filters.source {
        filter.insert("source", source.as_str());
    }
    if let Some(job_name) = &filters.job_name {
        filter.insert("jobName", job_name.as_str());
    }

    let (lower, upper) = filters.created_at_bounds();
    if lower.is_some() || upper.is_some() {
        let mut range = doc! {};
        if let Some(lower) = lower {
            range.insert("$gte", bson::DateTime::from_chrono(lower));
        }
        if let Some(upper) = upper {
            range.insert("$lt", bson::DateTime::from_chrono(upper));
        }
        filter.insert("createdAt", range);
    }

    filter
}
