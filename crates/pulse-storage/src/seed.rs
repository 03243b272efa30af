// Offline flow seeding
//
// Spreads each edge's total across the days of a window with +/-20% jitter and
// upserts one record per edge per day. Planning is pure; writing is best effort.

use std::collections::HashMap;

use pulse_core::{format_flow_key, DateRange, RawFlowRecord, SankeyGraph, SankeyLink, SankeyNode};
use rand::Rng;

use crate::handle::StoreHandle;

/// Maximum relative deviation applied to each daily value
pub const JITTER: f64 = 0.2;

/// Records to write plus the edges left out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedPlan {
    pub records: Vec<RawFlowRecord>,
    /// Edges pointing backwards in the node ordering, or naming an unknown node.
    pub skipped_edges: Vec<SankeyLink>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub written: usize,
    pub failed: usize,
}

/// Banking site journey used when no graph file is given
pub fn demo_graph() -> SankeyGraph {
    let nodes = [
        "Homepage",
        "Product Overview",
        "Rates & Fees",
        "Find a Branch/ATM",
        "About Us",
        "Login Page",
        "New Account Signup",
        "Account Summary",
        "User Exit",
    ];
    let links = [
        ("Homepage", "Product Overview", 500),
        ("Homepage", "Rates & Fees", 300),
        ("Homepage", "Find a Branch/ATM", 200),
        ("Homepage", "About Us", 100),
        ("Homepage", "Login Page", 400),
        ("Homepage", "New Account Signup", 250),
        ("Homepage", "User Exit", 150),
        ("Product Overview", "Rates & Fees", 250),
        ("Product Overview", "New Account Signup", 300),
        ("Rates & Fees", "New Account Signup", 150),
        ("Login Page", "Account Summary", 350),
        ("Login Page", "User Exit", 50),
        ("New Account Signup", "User Exit", 100),
        ("Product Overview", "User Exit", 50),
        ("Rates & Fees", "User Exit", 30),
        ("Find a Branch/ATM", "User Exit", 20),
        ("About Us", "User Exit", 10),
    ];

    SankeyGraph {
        nodes: nodes
            .iter()
            .map(|id| SankeyNode { id: id.to_string() })
            .collect(),
        links: links
            .iter()
            .map(|(source, target, value)| SankeyLink {
                source: source.to_string(),
                target: target.to_string(),
                value: *value,
            })
            .collect(),
    }
}

/// Plan one record per forward edge per day of `range`.
///
/// Daily value is `floor(total / days * (1 + jitter))` with jitter drawn from
/// `[-0.2, 0.2)`, never below zero.
pub fn plan_flow_seed<R: Rng>(graph: &SankeyGraph, range: &DateRange, rng: &mut R) -> SeedPlan {
    let order: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut plan = SeedPlan::default();
    let mut edges = Vec::new();
    for link in &graph.links {
        match (order.get(link.source.as_str()), order.get(link.target.as_str())) {
            (Some(source), Some(target)) if source <= target => edges.push(link),
            _ => {
                tracing::warn!(
                    source = %link.source,
                    target = %link.target,
                    "Skipping edge that would point backwards in the node ordering"
                );
                plan.skipped_edges.push(link.clone());
            }
        }
    }

    let days = f64::from(range.num_days());
    for day in range.days() {
        let flow_date = day.format(pulse_core::DATE_FORMAT).to_string();
        for link in &edges {
            let jitter = rng.gen_range(-JITTER..JITTER);
            let daily = (link.value as f64 / days * (1.0 + jitter)).floor().max(0.0);
            plan.records.push(RawFlowRecord::new(
                flow_date.clone(),
                format_flow_key(&link.source, &link.target),
                daily as u64,
            ));
        }
    }

    plan
}

/// Upsert every planned record; failures are logged and counted
pub async fn write_seed(store: &StoreHandle, records: &[RawFlowRecord]) -> SeedReport {
    let mut report = SeedReport::default();

    for record in records {
        let result = store
            .run(|backend| async move { backend.upsert_flow(record).await })
            .await;
        match result {
            Ok(()) => {
                report.written += 1;
                tracing::debug!(
                    flow_date = %record.flow_date,
                    flow_key = %record.flow_key,
                    "Seeded flow record"
                );
            }
            Err(e) => {
                report.failed += 1;
                tracing::error!(
                    flow_date = %record.flow_date,
                    flow_key = %record.flow_key,
                    error = %e,
                    "Failed to seed flow record"
                );
            }
        }
    }

    report
}
