// Integration tests for Pulse API against a running server
// Run with: cargo test --test integration_test -- --ignored
//
// Requirements:
// - pulse-api listening on localhost:9000
// - Flow records seeded for January 2025, e.g.
//   seed-flows --start 2025-01-01 --end 2025-01-31 --seed 1

use pulse_core::SankeyGraph;
use serde_json::Value;

const API_BASE_URL: &str = "http://localhost:9000";

#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_health() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", API_BASE_URL))
        .send()
        .await
        .expect("Failed to reach health endpoint");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse health");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore]
async fn test_sankey_workflow() {
    let client = reqwest::Client::new();

    println!("Fetching seeded flows...");
    let response = client
        .get(format!("{}/api/sankey-data", API_BASE_URL))
        .query(&[("startDate", "2025-01-01"), ("endDate", "2025-01-31")])
        .send()
        .await
        .expect("Failed to fetch sankey data");

    assert_eq!(response.status(), 200);
    let graph: SankeyGraph = response.json().await.expect("Failed to parse graph");
    println!("Got {} node(s), {} link(s)", graph.nodes.len(), graph.links.len());

    for link in &graph.links {
        assert!(graph.node_index(&link.source).is_some());
        assert!(graph.node_index(&link.target).is_some());
    }

    println!("Requesting without endDate...");
    let response = client
        .get(format!("{}/api/sankey-data", API_BASE_URL))
        .query(&[("startDate", "2025-01-01")])
        .send()
        .await
        .expect("Failed to call sankey endpoint");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["error"], "startDate and endDate are required");
}

#[tokio::test]
#[ignore]
async fn test_scroll_data() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/scroll-data", API_BASE_URL))
        .query(&[("limit", "5")])
        .send()
        .await
        .expect("Failed to fetch scroll data");

    assert_eq!(response.status(), 200);
    let events: Vec<Value> = response.json().await.expect("Failed to parse events");
    assert!(events.len() <= 5);
}

#[tokio::test]
#[ignore]
async fn test_page_analytics_root() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/page-analytics/_root", API_BASE_URL))
        .send()
        .await
        .expect("Failed to fetch page analytics");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse analytics");
    assert_eq!(body["pagePath"], "/");
}
