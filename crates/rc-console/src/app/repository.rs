//! App Repository

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Collection, Database};

use super::entity::{App, AppGrant, AppMssTelecom, DataStream, DataStreamApp, Identity, IdentityApp};
use super::filters::AppListFilters;
use crate::shared::error::Result;

/// Point lookups into the app registry
#[async_trait]
pub trait AppDirectory: Send + Sync {
    /// Exact, case-sensitive name match
    async fn find_by_name(&self, name: &str) -> Result<Option<App>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<App>>;

    /// Grants of an app, oldest first
    async fn find_grants(&self, app_id: i64) -> Result<Vec<AppGrant>>;
}

pub struct AppRepository {
    apps: Collection<App>,
    identities: Collection<Identity>,
    identity_apps: Collection<IdentityApp>,
    data_streams: Collection<DataStream>,
    data_stream_apps: Collection<DataStreamApp>,
    mss_telecoms: Collection<AppMssTelecom>,
    grants: Collection<AppGrant>,
}

impl AppRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            apps: db.collection("apps"),
            identities: db.collection("identities"),
            identity_apps: db.collection("identity_apps"),
            data_streams: db.collection("data_streams"),
            data_stream_apps: db.collection("data_stream_apps"),
            mss_telecoms: db.collection("app_mss_telecoms"),
            grants: db.collection("app_grants"),
        }
    }

    /// Filtered page of apps, newest id first
    pub async fn search(&self, filters: &AppListFilters, skip: u64, limit: i64) -> Result<Vec<App>> {
        let options = FindOptions::builder()
            .sort(doc! { "_id": -1 })
            .skip(skip)
            .limit(limit)
            .build();

        let cursor = self.apps
            .find(filters.to_document())
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self, filters: &AppListFilters) -> Result<u64> {
        Ok(self.apps.count_documents(filters.to_document()).await?)
    }

    /// Identity links of an app with the identity they point to
    pub async fn find_identities(&self, app_id: i64) -> Result<Vec<(IdentityApp, Option<Identity>)>> {
        let links: Vec<IdentityApp> = self.identity_apps
            .find(doc! { "appId": app_id })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        let ids: Vec<i64> = links.iter().map(|l| l.identity_id).collect();
        let identities: Vec<Identity> = self.identities
            .find(doc! { "_id": { "$in": ids } })
            .await?
            .try_collect()
            .await?;

        Ok(links.into_iter()
            .map(|link| {
                let identity = identities.iter().find(|i| i.id == link.identity_id).cloned();
                (link, identity)
            })
            .collect())
    }

    /// Data-stream bindings of an app with the stream they bind
    pub async fn find_data_stream_apps(&self, app_id: i64) -> Result<Vec<(DataStreamApp, Option<DataStream>)>> {
        let bindings: Vec<DataStreamApp> = self.data_stream_apps
            .find(doc! { "appId": app_id })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        let ids: Vec<i64> = bindings.iter().map(|b| b.data_stream_id).collect();
        let streams: Vec<DataStream> = self.data_streams
            .find(doc! { "_id": { "$in": ids } })
            .await?
            .try_collect()
            .await?;

        Ok(bindings.into_iter()
            .map(|binding| {
                let stream = streams.iter().find(|s| s.id == binding.data_stream_id).cloned();
                (binding, stream)
            })
            .collect())
    }

    pub async fn find_mss_telecoms(&self, app_id: i64) -> Result<Vec<AppMssTelecom>> {
        let cursor = self.mss_telecoms
            .find(doc! { "appId": app_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl AppDirectory for AppRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<App>> {
        Ok(self.apps.find_one(doc! { "name": name }).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<App>> {
        Ok(self.apps.find_one(doc! { "_id": id }).await?)
    }

    async fn find_grants(&self, app_id: i64) -> Result<Vec<AppGrant>> {
        let cursor = self.grants
            .find(doc! { "appId": app_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
