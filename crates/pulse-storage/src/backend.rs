// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use std::sync::Arc;

use pulse_core::{DateRange, EventCategory, EventRecord, RawFlowRecord};

use crate::error::StoreError;
use crate::memory::InMemoryDatabase;
use crate::models::*;
use crate::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Short backend name for logs and the health endpoint
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "memory",
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(db) => db.ping().await,
            Self::InMemory(db) => db.ping().await,
        }
    }

    pub async fn close(&self) {
        if let Self::Postgres(db) = self {
            db.close().await;
        }
    }

    // ============================================
    // Events
    // ============================================

    pub async fn find_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, StoreError> {
        match self {
            Self::Postgres(db) => db.find_events(query).await,
            Self::InMemory(db) => db.find_events(query).await,
        }
    }

    pub async fn insert_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        match self {
            Self::Postgres(db) => db.insert_event(record).await,
            Self::InMemory(db) => db.insert_event(record).await,
        }
    }

    pub async fn count_distinct_sessions(
        &self,
        category: EventCategory,
        range: &DateRange,
        page_path: Option<&str>,
    ) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(db) => db.count_distinct_sessions(category, range, page_path).await,
            Self::InMemory(db) => db.count_distinct_sessions(category, range, page_path).await,
        }
    }

    pub async fn distinct_page_paths(
        &self,
        category: EventCategory,
        range: &DateRange,
    ) -> Result<Vec<String>, StoreError> {
        match self {
            Self::Postgres(db) => db.distinct_page_paths(category, range).await,
            Self::InMemory(db) => db.distinct_page_paths(category, range).await,
        }
    }

    // ============================================
    // Flow records
    // ============================================

    pub async fn find_flows(&self, range: &DateRange) -> Result<Vec<RawFlowRecord>, StoreError> {
        match self {
            Self::Postgres(db) => db.find_flows(range).await,
            Self::InMemory(db) => db.find_flows(range).await,
        }
    }

    pub async fn upsert_flow(&self, record: &RawFlowRecord) -> Result<(), StoreError> {
        match self {
            Self::Postgres(db) => db.upsert_flow(record).await,
            Self::InMemory(db) => db.upsert_flow(record).await,
        }
    }
}
