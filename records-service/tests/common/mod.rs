#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mongodb::bson::{doc, Document};
use records_service::config::UpdatePolicy;
use records_service::services::{InMemoryStore, RecordsRepository};
use records_service::{build_router, AppState};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const PAYROLL_COLLECTION: &str = "unisyseportal";
pub const SHIPPING_COLLECTION: &str = "ibmzowe";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub log_file: PathBuf,
    _log_dir: TempDir,
}

impl TestApp {
    /// Router over an in-memory store seeded with one payroll and one shipping document.
    pub fn spawn() -> Self {
        Self::build(true, true, UpdatePolicy::default())
    }

    /// Router over a reachable store holding no documents.
    pub fn empty() -> Self {
        Self::build(true, false, UpdatePolicy::default())
    }

    /// Router whose database handle was never configured.
    pub fn without_database() -> Self {
        Self::build(false, true, UpdatePolicy::default())
    }

    pub fn with_policy(policy: UpdatePolicy) -> Self {
        Self::build(true, true, policy)
    }

    fn build(with_database: bool, seed: bool, policy: UpdatePolicy) -> Self {
        let store = Arc::new(InMemoryStore::new());
        if seed {
            store
                .insert(PAYROLL_COLLECTION, payroll_document())
                .expect("Failed to seed payroll");
            store
                .insert(SHIPPING_COLLECTION, shipping_document())
                .expect("Failed to seed shipping");
        }

        let repository = with_database.then(|| {
            RecordsRepository::new(store.clone(), PAYROLL_COLLECTION, SHIPPING_COLLECTION)
        });

        let log_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let log_file = log_dir.path().join("app.log");

        let state = AppState::new(repository, log_file.clone(), policy);

        TestApp {
            router: build_router(state),
            store,
            log_file,
            _log_dir: log_dir,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send_json(request).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(uri, "application/json", &body.to_string()).await
    }

    pub async fn post_raw(&self, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send_json(request).await
    }

    pub async fn get_text(&self, uri: &str) -> (StatusCode, Option<String>, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).expect("Response body is not JSON");
        (status, body)
    }

    pub fn shipping_person(&self) -> Document {
        self.store.documents(SHIPPING_COLLECTION).unwrap()[0]
            .get_document("shippingPerson")
            .unwrap()
            .clone()
    }

    pub fn payroll_records(&self) -> Vec<Document> {
        self.store.documents(PAYROLL_COLLECTION).unwrap()[0]
            .get_document("data")
            .unwrap()
            .get_array("payrollRecords")
            .unwrap()
            .iter()
            .map(|record| record.as_document().unwrap().clone())
            .collect()
    }
}

pub fn payroll_document() -> Document {
    doc! {
        "_id": 1,
        "data": {
            "payrollRecords": [
                { "crewMemberId": "C100", "name": "Ann", "salary": 5000 },
                { "crewMemberId": "C200", "name": "Bo", "salary": 6000 },
            ]
        }
    }
}

pub fn shipping_document() -> Document {
    doc! {
        "_id": 2,
        "shippingPerson": { "id": "S1", "name": "Cy", "address": "Old Street 1" }
    }
}
