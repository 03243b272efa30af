// Flow aggregator
//
// Loads raw daily flow records for a window and folds them into a Sankey graph.

use std::sync::Arc;

use pulse_core::{aggregate_flows, DateRange, RawFlowRecord, SankeyGraph};

use crate::error::{recover, StoreError};
use crate::handle::StoreHandle;

#[derive(Clone)]
pub struct FlowAggregator {
    store: Arc<StoreHandle>,
}

impl FlowAggregator {
    pub fn new(store: Arc<StoreHandle>) -> Self {
        Self { store }
    }

    /// Raw records with `start <= flow_date <= end`
    pub async fn raw_flows(&self, range: &DateRange) -> Result<Vec<RawFlowRecord>, StoreError> {
        let result = self
            .store
            .run(|backend| async move { backend.find_flows(range).await })
            .await;
        recover(result, "find_flows", Vec::new)
    }

    /// Sankey graph of all flows inside the window; empty when nothing matched
    pub async fn flow_graph(&self, range: &DateRange) -> Result<SankeyGraph, StoreError> {
        let records = self.raw_flows(range).await?;
        let fetched = records.len();

        let aggregation = aggregate_flows(records);
        tracing::info!(
            start_date = %range.start_date(),
            end_date = %range.end_date(),
            records = fetched,
            skipped = aggregation.skipped,
            nodes = aggregation.graph.nodes.len(),
            links = aggregation.graph.links.len(),
            "Aggregated flow records"
        );

        Ok(aggregation.graph)
    }
}
