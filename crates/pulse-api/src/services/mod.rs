// Services layer for analytics views
// Services combine repository calls and derive summaries; handlers stay thin

pub mod page_analytics;

pub use page_analytics::{PageAnalytics, PageAnalyticsService};
