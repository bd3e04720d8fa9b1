use crate::models::{RecordKind, UpdateOutcome};
use crate::services::database::DocumentStore;
use crate::services::error::StoreError;
use mongodb::bson::{doc, to_bson, Bson, Document};
use serde_json::Value;
use std::sync::Arc;

/// Payroll and shipping access on top of a [`DocumentStore`].
///
/// Reads and writes probe connectivity first so an unreachable database fails fast,
/// before any query is issued.
#[derive(Clone)]
pub struct RecordsRepository {
    store: Arc<dyn DocumentStore>,
    payroll_collection: String,
    shipping_collection: String,
}

impl RecordsRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        payroll_collection: impl Into<String>,
        shipping_collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            payroll_collection: payroll_collection.into(),
            shipping_collection: shipping_collection.into(),
        }
    }

    pub fn collection(&self, kind: RecordKind) -> &str {
        match kind {
            RecordKind::Payroll => &self.payroll_collection,
            RecordKind::Shipping => &self.shipping_collection,
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    /// Every document of the collection, without `_id`, as relaxed extended JSON.
    pub async fn fetch_all(&self, kind: RecordKind) -> Result<Vec<Value>, StoreError> {
        self.ping().await?;

        let documents = self
            .store
            .find(self.collection(kind), doc! {}, doc! { "_id": 0 })
            .await?;

        Ok(documents
            .into_iter()
            .map(|document| Bson::Document(document).into_relaxed_extjson())
            .collect())
    }

    /// Sets a single field on the record whose identifier equals `id`.
    pub async fn update_field(
        &self,
        kind: RecordKind,
        id: &Value,
        field: &str,
        value: &Value,
    ) -> Result<UpdateOutcome, StoreError> {
        self.ping().await?;

        let mut filter = Document::new();
        filter.insert(kind.id_path(), to_bson(id)?);

        let mut set = Document::new();
        set.insert(kind.update_path(field), to_bson(value)?);

        self.store
            .update_one(self.collection(kind), filter, doc! { "$set": set })
            .await
    }

    pub async fn count(&self, kind: RecordKind) -> Result<u64, StoreError> {
        self.store
            .count_documents(self.collection(kind), doc! {})
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryStore;
    use serde_json::json;

    fn repository(store: Arc<InMemoryStore>) -> RecordsRepository {
        RecordsRepository::new(store, "unisyseportal", "ibmzowe")
    }

    #[tokio::test]
    async fn fetch_strips_identity_field() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert("ibmzowe", doc! { "_id": 1, "shippingPerson": { "id": "S1" } })
            .unwrap();

        let records = repository(store).fetch_all(RecordKind::Shipping).await.unwrap();

        assert_eq!(records, vec![json!({ "shippingPerson": { "id": "S1" } })]);
    }

    #[tokio::test]
    async fn unknown_identifier_matches_nothing() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert("ibmzowe", doc! { "shippingPerson": { "id": "S1" } })
            .unwrap();

        let outcome = repository(store)
            .update_field(RecordKind::Shipping, &json!("S404"), "address", &json!("X"))
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome { matched: 0, modified: 0 });
    }

    #[tokio::test]
    async fn unreachable_store_fails_before_querying() {
        let store = Arc::new(InMemoryStore::new());
        store.set_available(false);

        let result = repository(store).fetch_all(RecordKind::Payroll).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
