// Raw daily flow records
//
// A flow record stores how many visitors moved from one page to another on a
// given day. The edge is encoded in a single key: "<source>-><target>".

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator between source and target in a flow key
pub const FLOW_KEY_SEPARATOR: &str = "->";

/// Stored count as found in a document: integers, or numeric strings from older writers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowCount {
    Int(i64),
    Text(String),
}

impl FlowCount {
    /// Parse to a non-negative integer weight
    pub fn parse(&self) -> Result<u64> {
        match self {
            FlowCount::Int(n) => {
                u64::try_from(*n).map_err(|_| Error::InvalidCount(n.to_string()))
            }
            FlowCount::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidCount(s.clone())),
        }
    }
}

impl From<u64> for FlowCount {
    // Counts past i64::MAX keep their exact value as text
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(FlowCount::Int)
            .unwrap_or_else(|_| FlowCount::Text(value.to_string()))
    }
}

/// A raw daily flow aggregate keyed by `(flow_date, flow_key)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlowRecord {
    /// Calendar date, `YYYY-MM-DD`.
    pub flow_date: String,
    /// Edge encoded as `"<source>-><target>"`.
    pub flow_key: String,
    /// Weight for that edge on that date; absent counts are skipped during aggregation.
    #[serde(default)]
    pub count: Option<FlowCount>,
}

impl RawFlowRecord {
    pub fn new(flow_date: impl Into<String>, flow_key: impl Into<String>, count: u64) -> Self {
        Self {
            flow_date: flow_date.into(),
            flow_key: flow_key.into(),
            count: Some(FlowCount::from(count)),
        }
    }

    /// Split the flow key into `(source, target)`
    pub fn edge(&self) -> Result<(&str, &str)> {
        parse_flow_key(&self.flow_key)
    }

    /// Parsed count; a missing count is an error, zero is not
    pub fn weight(&self) -> Result<u64> {
        match &self.count {
            Some(count) => count.parse(),
            None => Err(Error::InvalidCount("missing".to_string())),
        }
    }
}

/// Split `"<source>-><target>"` into exactly two non-empty parts
pub fn parse_flow_key(key: &str) -> Result<(&str, &str)> {
    let mut parts = key.split(FLOW_KEY_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(source), Some(target), None) if !source.is_empty() && !target.is_empty() => {
            Ok((source, target))
        }
        _ => Err(Error::invalid_flow_key(key)),
    }
}

/// Encode an edge as a flow key
pub fn format_flow_key(source: &str, target: &str) -> String {
    format!("{source}{FLOW_KEY_SEPARATOR}{target}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flow_key() {
        assert_eq!(
            parse_flow_key("Homepage->Login Page").unwrap(),
            ("Homepage", "Login Page")
        );
        assert_eq!(format_flow_key("A", "B"), "A->B");
    }

    #[test]
    fn test_parse_flow_key_rejects_malformed() {
        for key in ["onlysource", "->B", "A->", "->", "", "A->B->C"] {
            assert!(parse_flow_key(key).is_err(), "expected '{key}' to be rejected");
        }
    }

    #[test]
    fn test_count_parsing() {
        assert_eq!(FlowCount::Int(15).parse().unwrap(), 15);
        assert_eq!(FlowCount::Int(0).parse().unwrap(), 0);
        assert_eq!(FlowCount::Text(" 42 ".into()).parse().unwrap(), 42);
        assert!(FlowCount::Int(-1).parse().is_err());
        assert!(FlowCount::Text("lots".into()).parse().is_err());
        assert!(FlowCount::Text("1.5".into()).parse().is_err());
    }

    #[test]
    fn test_large_count_is_not_wrapped() {
        let count = FlowCount::from(u64::MAX);
        assert_eq!(count.parse().unwrap(), u64::MAX);
        assert_eq!(FlowCount::from(7), FlowCount::Int(7));
    }

    #[test]
    fn test_record_weight() {
        let zero = RawFlowRecord::new("2025-01-01", "A->B", 0);
        assert_eq!(zero.weight().unwrap(), 0);

        let missing = RawFlowRecord {
            count: None,
            ..zero.clone()
        };
        assert!(missing.weight().is_err());
    }

    #[test]
    fn test_record_deserializes_string_and_number_counts() {
        let numeric: RawFlowRecord = serde_json::from_str(
            r#"{"flow_date":"2025-01-01","flow_key":"A->B","count":10}"#,
        )
        .unwrap();
        assert_eq!(numeric.weight().unwrap(), 10);

        let text: RawFlowRecord = serde_json::from_str(
            r#"{"flow_date":"2025-01-01","flow_key":"A->B","count":"7"}"#,
        )
        .unwrap();
        assert_eq!(text.weight().unwrap(), 7);

        let absent: RawFlowRecord =
            serde_json::from_str(r#"{"flow_date":"2025-01-01","flow_key":"A->B"}"#).unwrap();
        assert_eq!(absent.count, None);
    }
}
