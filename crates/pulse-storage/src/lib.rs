// Analytics storage layer with sqlx
//
// This crate provides the store behind the analytics API:
// - StoreHandle: lazily-connected, health-checked backend owned by the process
// - EventRepository: event queries, unique visitors, viewed pages
// - FlowAggregator: raw flow records folded into Sankey graphs
// - seed: offline flow seeding

pub mod backend;
pub mod error;
pub mod events;
pub mod flows;
pub mod handle;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod seed;

pub use backend::StorageBackend;
pub use error::StoreError;
pub use events::EventRepository;
pub use flows::FlowAggregator;
pub use handle::{StorageMode, StoreConfig, StoreHandle};
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
pub use seed::{demo_graph, plan_flow_seed, write_seed, SeedPlan, SeedReport};
