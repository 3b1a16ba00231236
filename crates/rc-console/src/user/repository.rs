//! User Repository

use async_trait::async_trait;
use bson::doc;
use mongodb::{Collection, Database};

use super::entity::User;
use crate::shared::error::Result;

/// Point lookups into the user directory
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Exact, case-sensitive email match
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }
}
