// Interaction event records
//
// Records are produced by an external ingestion path and are read-only here.
// Common identity fields are typed; the category-specific payload is kept as a
// flattened JSON map so unknown fields survive a round trip to the dashboard.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Closed set of interaction event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Scroll,
    Click,
    Performance,
    PageExit,
    Error,
    Activity,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Scroll,
        EventCategory::Click,
        EventCategory::Performance,
        EventCategory::PageExit,
        EventCategory::Error,
        EventCategory::Activity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Click => "click",
            Self::Performance => "performance",
            Self::PageExit => "page_exit",
            Self::Error => "error",
            Self::Activity => "activity",
        }
    }

    /// Name of the collection (table) holding this category
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Scroll => "scroll_events",
            Self::Click => "click_events",
            Self::Performance => "performance_events",
            Self::PageExit => "page_exit_events",
            Self::Error => "error_events",
            Self::Activity => "activity_events",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scroll" => Ok(Self::Scroll),
            "click" => Ok(Self::Click),
            "performance" => Ok(Self::Performance),
            // Route segments commonly use the hyphenated spelling
            "page_exit" | "page-exit" => Ok(Self::PageExit),
            "error" => Ok(Self::Error),
            "activity" => Ok(Self::Activity),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}

/// A stored interaction event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EventRecord {
    /// Identifier assigned at ingestion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Event category.
    pub event_type: EventCategory,
    /// ISO-8601 timestamp.
    #[cfg_attr(feature = "openapi", schema(example = "2025-03-01T12:30:00.000Z"))]
    pub timestamp: String,
    /// Visit identifier; many events share one session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    /// Category-specific fields (scroll_depth, analytics_id, load_time, ...).
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub data: Map<String, Value>,
}

impl EventRecord {
    pub fn new(event_type: EventCategory, timestamp: impl Into<String>) -> Self {
        Self {
            event_id: None,
            event_type,
            timestamp: timestamp.into(),
            session_id: None,
            page_url: None,
            page_path: None,
            page_title: None,
            data: Map::new(),
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_page_path(mut self, page_path: impl Into<String>) -> Self {
        self.page_path = Some(page_path.into());
        self
    }

    pub fn with_page_title(mut self, page_title: impl Into<String>) -> Self {
        self.page_title = Some(page_title.into());
        self
    }

    pub fn with_page_url(mut self, page_url: impl Into<String>) -> Self {
        self.page_url = Some(page_url.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Numeric payload field, accepting numbers or numeric strings
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.data.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Decode the payload into a typed view
    pub fn payload<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(Value::Object(self.data.clone())).ok()
    }

    pub fn scroll(&self) -> Option<ScrollData> {
        (self.event_type == EventCategory::Scroll)
            .then(|| self.payload())
            .flatten()
    }

    pub fn click(&self) -> Option<ClickData> {
        (self.event_type == EventCategory::Click)
            .then(|| self.payload())
            .flatten()
    }

    pub fn performance(&self) -> Option<PerformanceData> {
        (self.event_type == EventCategory::Performance)
            .then(|| self.payload())
            .flatten()
    }
}

/// Scroll event payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollData {
    #[serde(default)]
    pub scroll_depth: Option<f64>,
    #[serde(default)]
    pub scroll_direction: Option<String>,
    #[serde(default)]
    pub viewport_height: Option<f64>,
    #[serde(default)]
    pub document_height: Option<f64>,
}

/// Click event payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClickData {
    #[serde(default)]
    pub element_tag: Option<String>,
    #[serde(default)]
    pub x_position: Option<f64>,
    #[serde(default)]
    pub y_position: Option<f64>,
    #[serde(default)]
    pub analytics_id: Option<String>,
}

/// Performance event payload (milliseconds, CLS unitless)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    #[serde(default)]
    pub load_time: Option<f64>,
    #[serde(default)]
    pub dom_interactive_time: Option<f64>,
    #[serde(default)]
    pub dom_complete_time: Option<f64>,
    #[serde(default)]
    pub first_contentful_paint: Option<f64>,
    #[serde(default)]
    pub largest_contentful_paint: Option<f64>,
    #[serde(default)]
    pub first_input_delay: Option<f64>,
    #[serde(default)]
    pub cumulative_layout_shift: Option<f64>,
}
