// Pulse analytics domain
//
// Pure types and functions shared by the storage layer and the HTTP API:
// - event: event categories and schemaless event records
// - date_range: calendar ranges and their timestamp bounds
// - flow / sankey: raw flow records and their aggregation into a Sankey graph
// - page: page-path sentinels and page filters
// - summary: per-page scroll, click and performance summaries

pub mod date_range;
pub mod error;
pub mod event;
pub mod flow;
pub mod page;
pub mod sankey;
pub mod summary;

pub use date_range::{parse_date, DateRange, DATE_FORMAT};
pub use error::{Error, Result};
pub use event::{ClickData, EventCategory, EventRecord, PerformanceData, ScrollData};
pub use flow::{format_flow_key, parse_flow_key, FlowCount, RawFlowRecord, FLOW_KEY_SEPARATOR};
pub use page::{page_segment, resolve_page_segment, PageFilter, ROOT_SENTINEL};
pub use sankey::{aggregate_flows, Aggregation, SankeyGraph, SankeyLink, SankeyNode};
pub use summary::{click_counts, ClickCount, PerformanceSummary, ScrollSummary};
