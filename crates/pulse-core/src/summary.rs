// Per-page summaries derived from event lists

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::event::EventRecord;

/// Scroll depth and direction statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ScrollSummary {
    pub total_events: usize,
    pub average_depth: f64,
    pub max_depth: f64,
    pub down_scrolls: usize,
    pub up_scrolls: usize,
}

impl ScrollSummary {
    pub fn from_events(events: &[EventRecord]) -> Self {
        let depths: Vec<f64> = events
            .iter()
            .filter_map(|e| e.number("scroll_depth"))
            .collect();
        let direction_count = |dir: &str| {
            events
                .iter()
                .filter(|e| e.text("scroll_direction") == Some(dir))
                .count()
        };

        Self {
            total_events: events.len(),
            average_depth: mean(&depths).unwrap_or(0.0),
            max_depth: depths.iter().copied().fold(0.0, f64::max),
            down_scrolls: direction_count("down"),
            up_scrolls: direction_count("up"),
        }
    }
}

/// Clicks on one tracked element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClickCount {
    pub analytics_id: String,
    pub count: usize,
    /// Clicks as a percentage of unique visitors, two decimals.
    pub percentage: f64,
}

/// Group clicks by `analytics_id`, most clicked first.
///
/// Events without an analytics id are not tracked elements and are ignored.
pub fn click_counts(events: &[EventRecord], unique_visitors: u64) -> Vec<ClickCount> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for id in events.iter().filter_map(|e| e.text("analytics_id")) {
        if !id.is_empty() {
            *counts.entry(id).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<ClickCount> = counts
        .into_iter()
        .map(|(id, count)| ClickCount {
            analytics_id: id.to_string(),
            count,
            percentage: percentage(count as u64, unique_visitors),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.analytics_id.cmp(&b.analytics_id))
    });
    rows
}

/// Average web-vitals over the events that report each metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PerformanceSummary {
    pub sample_size: usize,
    pub load_time: Option<f64>,
    pub dom_interactive_time: Option<f64>,
    pub dom_complete_time: Option<f64>,
    pub first_contentful_paint: Option<f64>,
    pub largest_contentful_paint: Option<f64>,
    pub first_input_delay: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
}

impl PerformanceSummary {
    pub fn from_events(events: &[EventRecord]) -> Self {
        let average = |key: &str| {
            let values: Vec<f64> = events.iter().filter_map(|e| e.number(key)).collect();
            mean(&values)
        };

        Self {
            sample_size: events.len(),
            load_time: average("load_time"),
            dom_interactive_time: average("dom_interactive_time"),
            dom_complete_time: average("dom_complete_time"),
            first_contentful_paint: average("first_contentful_paint"),
            largest_contentful_paint: average("largest_contentful_paint"),
            first_input_delay: average("first_input_delay"),
            cumulative_layout_shift: average("cumulative_layout_shift"),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventCategory;

    fn scroll(depth: u64, direction: &str) -> EventRecord {
        EventRecord::new(EventCategory::Scroll, "2025-03-01T10:00:00Z")
            .with_field("scroll_depth", depth)
            .with_field("scroll_direction", direction)
    }

    fn click(id: Option<&str>) -> EventRecord {
        let record = EventRecord::new(EventCategory::Click, "2025-03-01T10:00:00Z");
        match id {
            Some(id) => record.with_field("analytics_id", id),
            None => record,
        }
    }

    #[test]
    fn test_scroll_summary() {
        let summary = ScrollSummary::from_events(&[
            scroll(20, "down"),
            scroll(80, "down"),
            scroll(50, "up"),
        ]);
        assert_eq!(summary.total_events, 3);
        assert_eq!(summary.average_depth, 50.0);
        assert_eq!(summary.max_depth, 80.0);
        assert_eq!(summary.down_scrolls, 2);
        assert_eq!(summary.up_scrolls, 1);
    }

    #[test]
    fn test_scroll_summary_empty() {
        assert_eq!(ScrollSummary::from_events(&[]), ScrollSummary::default());
    }

    #[test]
    fn test_click_counts_sorted_with_percentages() {
        let rows = click_counts(
            &[
                click(Some("nav-pricing")),
                click(Some("cta-signup")),
                click(Some("cta-signup")),
                click(None),
                click(Some("cta-signup")),
            ],
            8,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].analytics_id, "cta-signup");
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].percentage, 37.5);
        assert_eq!(rows[1].analytics_id, "nav-pricing");
        assert_eq!(rows[1].percentage, 12.5);
    }

    #[test]
    fn test_click_percentage_without_visitors() {
        let rows = click_counts(&[click(Some("a"))], 0);
        assert_eq!(rows[0].percentage, 0.0);
    }

    #[test]
    fn test_click_percentage_rounds_to_two_decimals() {
        let rows = click_counts(&[click(Some("a"))], 3);
        assert_eq!(rows[0].percentage, 33.33);
    }

    #[test]
    fn test_performance_summary_averages_reported_metrics() {
        let events = vec![
            EventRecord::new(EventCategory::Performance, "2025-03-01T10:00:00Z")
                .with_field("load_time", 1000)
                .with_field("first_contentful_paint", 300),
            EventRecord::new(EventCategory::Performance, "2025-03-01T11:00:00Z")
                .with_field("load_time", 2000),
        ];
        let summary = PerformanceSummary::from_events(&events);
        assert_eq!(summary.sample_size, 2);
        assert_eq!(summary.load_time, Some(1500.0));
        assert_eq!(summary.first_contentful_paint, Some(300.0));
        assert_eq!(summary.cumulative_layout_shift, None);
    }
}
