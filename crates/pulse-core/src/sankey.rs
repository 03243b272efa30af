// Sankey graph aggregation
//
// Folds raw daily flow records into one link per (source, target) pair with the
// counts summed across the window. Links and nodes keep first-seen order, which
// renderers use for layout; correctness does not depend on it.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::flow::RawFlowRecord;

/// Node in a Sankey graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SankeyNode {
    /// Page or state identifier.
    pub id: String,
}

/// Weighted directed edge in a Sankey graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SankeyLink {
    pub source: String,
    pub target: String,
    /// Sum of all raw counts for this edge in the queried window.
    pub value: u64,
}

/// Sankey diagram data: unique nodes and deduplicated links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SankeyGraph {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
}

impl SankeyGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty()
    }

    /// Build a graph from already-aggregated links; nodes are derived from them
    pub fn from_links(links: Vec<SankeyLink>) -> Self {
        let nodes: IndexSet<&str> = links
            .iter()
            .flat_map(|link| [link.source.as_str(), link.target.as_str()])
            .collect();
        let nodes: Vec<SankeyNode> = nodes
            .into_iter()
            .map(|id| SankeyNode { id: id.to_string() })
            .collect();
        Self { nodes, links }
    }

    /// Position of a node in `nodes`
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    pub fn link(&self, source: &str, target: &str) -> Option<&SankeyLink> {
        self.links
            .iter()
            .find(|link| link.source == source && link.target == target)
    }
}

/// Result of folding raw records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub graph: SankeyGraph,
    /// Records dropped for a malformed key or a missing/invalid count.
    pub skipped: usize,
}

/// Aggregate raw flow records into a Sankey graph.
///
/// Records with an unparseable `flow_key` or a missing or non-integer `count` are
/// skipped with a warning. A zero count is valid and contributes an edge.
pub fn aggregate_flows<I>(records: I) -> Aggregation
where
    I: IntoIterator<Item = RawFlowRecord>,
{
    let mut totals: IndexMap<(String, String), u64> = IndexMap::new();
    let mut skipped = 0;

    for record in records {
        let (source, target) = match record.edge() {
            Ok(edge) => edge,
            Err(e) => {
                tracing::warn!(
                    flow_date = %record.flow_date,
                    flow_key = %record.flow_key,
                    error = %e,
                    "Skipping flow record with malformed key"
                );
                skipped += 1;
                continue;
            }
        };

        let value = match record.weight() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    flow_date = %record.flow_date,
                    flow_key = %record.flow_key,
                    error = %e,
                    "Skipping flow record without a usable count"
                );
                skipped += 1;
                continue;
            }
        };

        let total = totals
            .entry((source.to_string(), target.to_string()))
            .or_insert(0);
        *total = total.saturating_add(value);
    }

    let links = totals
        .into_iter()
        .map(|((source, target), value)| SankeyLink {
            source,
            target,
            value,
        })
        .collect();

    Aggregation {
        graph: SankeyGraph::from_links(links),
        skipped,
    }
}
