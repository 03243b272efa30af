// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
//
// This implementation mirrors the Postgres repository API with in-process
// collections, so the API can run without a database and tests can seed data
// directly. An availability switch simulates an unreachable store.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use pulse_core::{DateRange, EventCategory, EventRecord, RawFlowRecord};

use crate::error::StoreError;
use crate::models::*;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
pub struct InMemoryDatabase {
    events: RwLock<HashMap<EventCategory, Vec<EventRecord>>>,
    // Keyed by (flow_date, flow_key)
    flows: RwLock<BTreeMap<(String, String), RawFlowRecord>>,
    available: AtomicBool,
    reads: AtomicUsize,
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self {
            events: RwLock::default(),
            flows: RwLock::default(),
            available: AtomicBool::new(true),
            reads: AtomicUsize::new(0),
        }
    }
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated availability; while unavailable every call fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of read operations served (including failed ones)
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn begin_read(&self) -> Result<(), StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }

    // ============================================
    // Events
    // ============================================

    pub async fn find_events(&self, query: &EventQuery) -> Result<Vec<EventRecord>, StoreError> {
        self.begin_read()?;
        let events = self.events.read();
        let mut matched: Vec<EventRecord> = events
            .get(&query.category)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| query.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(query.limit);
        Ok(matched)
    }

    pub async fn insert_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.events
            .write()
            .entry(record.event_type)
            .or_default()
            .push(record.clone());
        Ok(())
    }

    pub async fn count_distinct_sessions(
        &self,
        category: EventCategory,
        range: &DateRange,
        page_path: Option<&str>,
    ) -> Result<u64, StoreError> {
        self.begin_read()?;
        let events = self.events.read();
        let sessions: HashSet<&str> = events
            .get(&category)
            .into_iter()
            .flatten()
            .filter(|record| range.contains_timestamp(&record.timestamp))
            .filter(|record| page_path.map_or(true, |p| record.page_path.as_deref() == Some(p)))
            .filter_map(|record| record.session_id.as_deref())
            .collect();
        Ok(sessions.len() as u64)
    }

    pub async fn distinct_page_paths(
        &self,
        category: EventCategory,
        range: &DateRange,
    ) -> Result<Vec<String>, StoreError> {
        self.begin_read()?;
        let events = self.events.read();
        let paths: BTreeSet<&str> = events
            .get(&category)
            .into_iter()
            .flatten()
            .filter(|record| range.contains_timestamp(&record.timestamp))
            .filter_map(|record| record.page_path.as_deref())
            .collect();
        Ok(paths.into_iter().map(str::to_string).collect())
    }

    // ============================================
    // Flow records
    // ============================================

    pub async fn find_flows(&self, range: &DateRange) -> Result<Vec<RawFlowRecord>, StoreError> {
        self.begin_read()?;
        Ok(self
            .flows
            .read()
            .values()
            .filter(|record| range.contains_date(&record.flow_date))
            .cloned()
            .collect())
    }

    pub async fn upsert_flow(&self, record: &RawFlowRecord) -> Result<(), StoreError> {
        self.check_available()?;
        self.flows.write().insert(
            (record.flow_date.clone(), record.flow_key.clone()),
            record.clone(),
        );
        Ok(())
    }
}
