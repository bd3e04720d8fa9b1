use crate::models::UpdateOutcome;
use crate::services::database::DocumentStore;
use crate::services::error::StoreError;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Process-local [`DocumentStore`] for tests and local runs.
///
/// Understands the query shapes the records routes issue: dotted-path equality filters,
/// top-level exclusion projections and `$set` updates, including the positional `$`.
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn insert(&self, collection: &str, document: Document) -> Result<(), StoreError> {
        self.lock()?
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    /// Snapshot of a collection's raw contents.
    pub fn documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.lock()?.get(collection).cloned().unwrap_or_default())
    }

    /// Simulates an outage: every operation fails while unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<Document>>>, StoreError> {
        self.collections
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("In-memory store mutex poisoned: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Document,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        let collections = self.lock()?;
        let found = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| document_matches(doc, &filter))
                    .map(|doc| project(doc, &projection))
                    .collect()
            })
            .unwrap_or_default();
        Ok(found)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, StoreError> {
        self.check_available()?;
        let mut collections = self.lock()?;
        let Some(target) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| document_matches(doc, &filter)))
        else {
            return Ok(UpdateOutcome::default());
        };

        // Apply to a copy so a failing path leaves the stored document untouched
        let mut updated = target.clone();
        let mut modified = false;
        for (operator, fields) in update.iter() {
            let Bson::Document(fields) = fields else {
                return Err(StoreError::InvalidUpdate(format!(
                    "{} expects a document",
                    operator
                )));
            };
            if operator != "$set" {
                return Err(StoreError::InvalidUpdate(format!(
                    "unsupported update operator {}",
                    operator
                )));
            }
            for (path, value) in fields.iter() {
                let path = resolve_positional(path, target, &filter)?;
                let segments: Vec<&str> = path.split('.').collect();
                modified |= set_in_document(&mut updated, &segments, value)?;
            }
        }

        if modified {
            *target = updated;
        }
        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    async fn count_documents(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<u64, StoreError> {
        self.check_available()?;
        let collections = self.lock()?;
        let count = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| document_matches(doc, &filter)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }
}

fn document_matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(path, expected)| {
        let segments: Vec<&str> = path.split('.').collect();
        doc.get(segments[0])
            .is_some_and(|value| value_matches(value, &segments[1..], expected))
    })
}

/// Equality at a dotted path. Arrays match when any element matches the remaining path,
/// or when a numeric segment indexes a matching element.
fn value_matches(value: &Bson, segments: &[&str], expected: &Bson) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return match value {
            Bson::Array(items) => value == expected || items.contains(expected),
            _ => value == expected,
        };
    };

    match value {
        Bson::Document(doc) => doc
            .get(*head)
            .is_some_and(|child| value_matches(child, rest, expected)),
        Bson::Array(items) => {
            let by_index = head
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .is_some_and(|item| value_matches(item, rest, expected));
            by_index
                || items
                    .iter()
                    .any(|item| value_matches(item, segments, expected))
        }
        _ => false,
    }
}

fn project(doc: &Document, projection: &Document) -> Document {
    let mut projected = doc.clone();
    for (field, flag) in projection.iter() {
        let excluded = matches!(
            flag,
            Bson::Int32(0) | Bson::Int64(0) | Bson::Boolean(false)
        );
        if excluded {
            projected.remove(field);
        }
    }
    projected
}

/// Replaces a `$` segment with the index of the first array element satisfying the
/// filter condition on that array.
fn resolve_positional(path: &str, doc: &Document, filter: &Document) -> Result<String, StoreError> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some(position) = segments.iter().position(|segment| *segment == "$") else {
        return Ok(path.to_string());
    };

    let array_path = segments[..position].join(".");
    let prefix = format!("{}.", array_path);
    let not_found = || {
        StoreError::InvalidUpdate(
            "The positional operator did not find the match needed from the query".to_string(),
        )
    };

    let (condition_path, expected) = filter
        .iter()
        .find_map(|(key, value)| key.strip_prefix(&prefix).map(|rest| (rest, value)))
        .ok_or_else(not_found)?;
    let condition: Vec<&str> = condition_path.split('.').collect();

    let Some(Bson::Array(items)) = get_path(doc, &segments[..position]) else {
        return Err(not_found());
    };
    let index = items
        .iter()
        .position(|item| value_matches(item, &condition, expected))
        .ok_or_else(not_found)?;

    let mut resolved: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
    resolved[position] = index.to_string();
    Ok(resolved.join("."))
}

fn get_path<'a>(doc: &'a Document, segments: &[&str]) -> Option<&'a Bson> {
    let (head, rest) = segments.split_first()?;
    let mut current = doc.get(*head)?;
    for segment in rest {
        current = match current {
            Bson::Document(inner) => inner.get(*segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at the path, creating intermediate documents. Returns whether the
/// stored value changed.
fn set_in_document(doc: &mut Document, segments: &[&str], value: &Bson) -> Result<bool, StoreError> {
    let Some((head, rest)) = segments.split_first() else {
        return Err(StoreError::InvalidUpdate("empty field path".to_string()));
    };
    if head.is_empty() {
        return Err(StoreError::InvalidUpdate("empty field name in path".to_string()));
    }

    if rest.is_empty() {
        let previous = doc.insert(*head, value.clone());
        return Ok(previous.as_ref() != Some(value));
    }

    if !doc.contains_key(*head) {
        doc.insert(*head, Document::new());
    }
    match doc.get_mut(*head) {
        Some(child) => set_in_value(child, rest, value),
        None => Err(StoreError::InvalidUpdate(format!("cannot create field '{}'", head))),
    }
}

fn set_in_value(target: &mut Bson, segments: &[&str], value: &Bson) -> Result<bool, StoreError> {
    match target {
        Bson::Document(doc) => set_in_document(doc, segments, value),
        Bson::Array(items) => {
            let Some((head, rest)) = segments.split_first() else {
                return Err(StoreError::InvalidUpdate("empty field path".to_string()));
            };
            let slot = head
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get_mut(index))
                .ok_or_else(|| {
                    StoreError::InvalidUpdate(format!("cannot address array element '{}'", head))
                })?;
            if rest.is_empty() {
                let changed = slot != value;
                *slot = value.clone();
                Ok(changed)
            } else {
                set_in_value(slot, rest, value)
            }
        }
        _ => Err(StoreError::InvalidUpdate(format!(
            "cannot create field '{}' in a non-document value",
            segments.first().copied().unwrap_or_default()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn payroll_document() -> Document {
        doc! {
            "data": {
                "payrollRecords": [
                    { "crewMemberId": "C1", "salary": 100 },
                    { "crewMemberId": "C2", "salary": 200 },
                ]
            }
        }
    }

    #[tokio::test]
    async fn filters_descend_into_arrays() {
        let store = InMemoryStore::new();
        store.insert("payroll", payroll_document()).unwrap();

        let hits = store
            .count_documents("payroll", doc! { "data.payrollRecords.crewMemberId": "C2" })
            .await
            .unwrap();
        let misses = store
            .count_documents("payroll", doc! { "data.payrollRecords.crewMemberId": "C9" })
            .await
            .unwrap();

        assert_eq!(hits, 1);
        assert_eq!(misses, 0);
    }

    #[tokio::test]
    async fn positional_set_touches_only_matched_element() {
        let store = InMemoryStore::new();
        store.insert("payroll", payroll_document()).unwrap();

        let outcome = store
            .update_one(
                "payroll",
                doc! { "data.payrollRecords.crewMemberId": "C2" },
                doc! { "$set": { "data.payrollRecords.$.salary": 250 } },
            )
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });
        let docs = store.documents("payroll").unwrap();
        let stored = &docs[0];
        let records = stored.get_document("data").unwrap().get_array("payrollRecords").unwrap();
        assert_eq!(records[0].as_document().unwrap().get_i32("salary").unwrap(), 100);
        assert_eq!(records[1].as_document().unwrap().get_i32("salary").unwrap(), 250);
    }

    #[tokio::test]
    async fn unchanged_value_reports_zero_modified() {
        let store = InMemoryStore::new();
        store
            .insert("shipping", doc! { "shippingPerson": { "id": "S1", "address": "X" } })
            .unwrap();

        let outcome = store
            .update_one(
                "shipping",
                doc! { "shippingPerson.id": "S1" },
                doc! { "$set": { "shippingPerson.address": "X" } },
            )
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 0 });
    }

    #[tokio::test]
    async fn set_creates_missing_intermediate_documents() {
        let store = InMemoryStore::new();
        store.insert("shipping", doc! { "shippingPerson": { "id": "S1" } }).unwrap();

        store
            .update_one(
                "shipping",
                doc! { "shippingPerson.id": "S1" },
                doc! { "$set": { "shippingPerson.contact.phone": "555" } },
            )
            .await
            .unwrap();

        let docs = store.documents("shipping").unwrap();
        let stored = &docs[0];
        let phone = stored
            .get_document("shippingPerson")
            .and_then(|p| p.get_document("contact"))
            .and_then(|c| c.get_str("phone"))
            .unwrap();
        assert_eq!(phone, "555");
    }

    #[tokio::test]
    async fn writing_through_a_scalar_fails_without_partial_changes() {
        let store = InMemoryStore::new();
        store
            .insert("shipping", doc! { "shippingPerson": { "id": "S1", "name": "Ann" } })
            .unwrap();

        let result = store
            .update_one(
                "shipping",
                doc! { "shippingPerson.id": "S1" },
                doc! { "$set": { "shippingPerson.name.first": "Bo" } },
            )
            .await;

        assert!(matches!(result, Err(StoreError::InvalidUpdate(_))));
        let docs = store.documents("shipping").unwrap();
        let stored = &docs[0];
        assert_eq!(stored.get_document("shippingPerson").unwrap().get_str("name").unwrap(), "Ann");
    }

    #[tokio::test]
    async fn exclusion_projection_drops_identity() {
        let store = InMemoryStore::new();
        store.insert("shipping", doc! { "_id": 7, "shippingPerson": { "id": "S1" } }).unwrap();

        let found = store
            .find("shipping", doc! {}, doc! { "_id": 0 })
            .await
            .unwrap();

        assert_eq!(found, vec![doc! { "shippingPerson": { "id": "S1" } }]);
    }

    #[tokio::test]
    async fn offline_store_fails_every_operation() {
        let store = InMemoryStore::new();
        store.set_available(false);

        assert!(store.ping().await.is_err());
        assert!(store.count_documents("payroll", doc! {}).await.is_err());

        store.set_available(true);
        assert!(store.ping().await.is_ok());
    }
}
