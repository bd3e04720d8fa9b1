use crate::models::UpdateOutcome;
use crate::services::error::StoreError;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, FindOptions},
    Client as MongoClient, Database,
};

/// The narrow slice of a document database the records routes rely on.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Cheap liveness command issued before every data-touching operation.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Document,
    ) -> Result<Vec<Document>, StoreError>;

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn count_documents(&self, collection: &str, filter: Document)
        -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    /// Parses the URI and builds a client. The driver connects lazily, so an unreachable
    /// server only shows up on the first `ping`.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            StoreError::from(e)
        })?;
        options.app_name = Some("records-service".to_string());

        let client = MongoClient::with_options(options)?;
        let db = client.database(database);
        tracing::info!(database = %database, "MongoDB client initialised");
        Ok(Self { client, db })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Document,
    ) -> Result<Vec<Document>, StoreError> {
        let options = FindOptions::builder().projection(projection).build();
        let cursor = self
            .db
            .collection::<Document>(collection)
            .find(filter, options)
            .await?;
        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .db
            .collection::<Document>(collection)
            .update_one(filter, update, None)
            .await?;
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, StoreError> {
        Ok(self
            .db
            .collection::<Document>(collection)
            .count_documents(filter, None)
            .await?)
    }
}
