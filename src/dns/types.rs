//! Core data types for a DNS performance-testing run.
//!
//! This module provides the types flowing through a run: the queries and
//! nameservers under test, the per-lookup results, and the report envelope
//! that gets serialized to JSON.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use trust_dns_resolver::proto::rr::RecordType;

/// Version tag embedded in every serialized report so downstream
/// consumers can detect format changes.
pub const DATA_FORMAT_VERSION: u32 = 2;

/// Response placeholder recorded when a lookup fails.
pub const ERR_RESPONSE: &str = "Err";

/// TTL sentinel recorded when no answer was obtained.
pub const TTL_SENTINEL: i64 = -1;

/// Supported DNS record types.
///
/// One variant per record type this tool knows how to render. Adding a new
/// record type means adding a variant here plus a rendering arm in the
/// resolution engine, not extending a string-comparison chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
    /// Mail exchange record
    Mx,
    /// Reverse-lookup pointer record
    Ptr,
    /// Start-of-authority record
    Soa,
    /// Canonical name record
    Cname,
    /// Nameserver record
    Ns,
}

impl RecordKind {
    /// Map to the resolver library's record type.
    #[must_use]
    pub fn record_type(self) -> RecordType {
        match self {
            Self::A => RecordType::A,
            Self::Aaaa => RecordType::AAAA,
            Self::Mx => RecordType::MX,
            Self::Ptr => RecordType::PTR,
            Self::Soa => RecordType::SOA,
            Self::Cname => RecordType::CNAME,
            Self::Ns => RecordType::NS,
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Self::A),
            "aaaa" => Ok(Self::Aaaa),
            "mx" => Ok(Self::Mx),
            "ptr" => Ok(Self::Ptr),
            "soa" => Ok(Self::Soa),
            "cname" => Ok(Self::Cname),
            "ns" => Ok(Self::Ns),
            _ => Err(format!("Unknown record type: {s}")),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "a",
            Self::Aaaa => "aaaa",
            Self::Mx => "mx",
            Self::Ptr => "ptr",
            Self::Soa => "soa",
            Self::Cname => "cname",
            Self::Ns => "ns",
        };
        write!(f, "{s}")
    }
}

/// One query to resolve: a record type and a name.
///
/// The record type is held as the lowercased raw string from the input file.
/// Input parsing is purely syntactic; an unknown type is only rejected when
/// the resolution engine tries to dispatch on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Lowercased record type string (e.g. "a", "mx")
    pub record: String,
    /// Domain name, or address string for PTR queries
    pub name: String,
}

impl Query {
    /// Create a new query.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let query = Query::new("mx", "example.com");
    /// ```
    pub fn new(record: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            record: record.into().to_ascii_lowercase(),
            name: name.into(),
        }
    }

    /// Parse the raw record type string into a [`RecordKind`].
    ///
    /// # Errors
    ///
    /// Returns the unparsed type string if it names no supported record type.
    pub fn kind(&self) -> std::result::Result<RecordKind, String> {
        self.record.parse()
    }
}

// A query serializes as the one-entry map the batch format uses:
// {"a": "example.com"}.
impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.record, &self.name)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = IndexMap::<String, String>::deserialize(deserializer)?;
        let (record, name) = entries
            .into_iter()
            .next()
            .ok_or_else(|| D::Error::custom("query object has no entries"))?;
        Ok(Self { record, name })
    }
}

/// Outcome of resolving one query against one nameserver.
///
/// Created once per lookup and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// The query that was issued
    pub query: Query,
    /// Textual form of each answer record, or `["Err"]` on failure
    pub response: Vec<String>,
    /// Wall-clock elapsed time in milliseconds, one decimal place
    #[serde(rename = "responseTime", with = "millis_string")]
    pub response_time_ms: f64,
    /// Answer-set TTL in seconds, or `-1` when no answer was obtained
    pub ttl: i64,
}

impl QueryResult {
    /// Create a result for a successful lookup.
    #[must_use]
    pub fn answered(query: Query, response: Vec<String>, elapsed_ms: f64, ttl: i64) -> Self {
        Self {
            query,
            response,
            response_time_ms: round_millis(elapsed_ms),
            ttl,
        }
    }

    /// Create the sentinel result recorded for a failed lookup.
    #[must_use]
    pub fn failed(query: Query, elapsed_ms: f64) -> Self {
        Self {
            query,
            response: vec![ERR_RESPONSE.to_string()],
            response_time_ms: round_millis(elapsed_ms),
            ttl: TTL_SENTINEL,
        }
    }

    /// Check whether this result carries the failure sentinel.
    #[must_use]
    pub fn is_err(&self) -> bool {
        self.ttl == TTL_SENTINEL
    }
}

/// Round elapsed milliseconds to the single decimal place the report keeps.
#[must_use]
pub fn round_millis(ms: f64) -> f64 {
    (ms * 10.0).round() / 10.0
}

// The batch format stores response times as strings with exactly one
// fractional digit ("12.3"), not as JSON numbers.
mod millis_string {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &f64,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:.1}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<f64>()
            .map_err(|e| D::Error::custom(format!("bad response time {raw:?}: {e}")))
    }
}

/// Results of one full run: nameserver -> per-query results.
///
/// Key order is insertion order, which is the order nameservers were
/// processed in; each value holds one entry per input query, in query order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RunResult(pub IndexMap<String, Vec<QueryResult>>);

impl RunResult {
    /// Create an empty result set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one query result under a nameserver key.
    pub fn record(&mut self, nameserver: &str, result: QueryResult) {
        self.0
            .entry(nameserver.to_string())
            .or_default()
            .push(result);
    }

    /// Number of nameserver keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no nameserver has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate nameserver keys and their result sequences in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<QueryResult>)> {
        self.0.iter()
    }
}

/// Full output envelope for one run.
///
/// Field names are fixed by the JSON batch format the converter consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Persistent device UUID (empty if identity was never created)
    pub device_uuid: String,
    /// User-assigned device tag (empty if unset)
    pub device_tag: String,
    /// Hostname of the machine that ran the test
    pub host_name: String,
    /// UTC timestamp taken before the first lookup
    #[serde(rename = "scriptUTCStartTime")]
    pub script_utc_start_time: DateTime<Utc>,
    /// UTC timestamp taken after the last lookup
    #[serde(rename = "scriptUTCEndTime")]
    pub script_utc_end_time: DateTime<Utc>,
    /// Serialized format version, see [`DATA_FORMAT_VERSION`]
    pub data_format_version: u32,
    /// The run's results, keyed by nameserver
    pub query_results: RunResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_parse_case_insensitive() {
        assert_eq!("MX".parse::<RecordKind>(), Ok(RecordKind::Mx));
        assert_eq!("mx".parse::<RecordKind>(), Ok(RecordKind::Mx));
        assert_eq!("AaAa".parse::<RecordKind>(), Ok(RecordKind::Aaaa));
        assert!("txt".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_record_kind_display() {
        assert_eq!(RecordKind::A.to_string(), "a");
        assert_eq!(RecordKind::Soa.to_string(), "soa");
    }

    #[test]
    fn test_query_lowercases_record() {
        let query = Query::new("MX", "example.com");
        assert_eq!(query.record, "mx");
        assert_eq!(query.kind(), Ok(RecordKind::Mx));
    }

    #[test]
    fn test_query_serializes_as_single_entry_map() {
        let query = Query::new("a", "example.com");
        let json = serde_json::to_string(&query).unwrap();
        assert_eq!(json, r#"{"a":"example.com"}"#);

        let parsed: Query = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, query);
    }

    #[test]
    fn test_failed_result_sentinel() {
        let result = QueryResult::failed(Query::new("a", "example.com"), 3.14);
        assert_eq!(result.response, vec![ERR_RESPONSE.to_string()]);
        assert_eq!(result.ttl, TTL_SENTINEL);
        assert!(result.is_err());
        assert!((result.response_time_ms - 3.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_response_time_serializes_with_one_decimal() {
        let result = QueryResult::answered(
            Query::new("a", "example.com"),
            vec!["93.184.216.34".to_string()],
            12.0,
            300,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["responseTime"], "12.0");

        let back: QueryResult = serde_json::from_value(json).unwrap();
        assert!((back.response_time_ms - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_run_result_preserves_insertion_order() {
        let mut results = RunResult::new();
        results.record("9.9.9.9", QueryResult::failed(Query::new("a", "x.com"), 1.0));
        results.record("1.1.1.1", QueryResult::failed(Query::new("a", "x.com"), 1.0));
        results.record("9.9.9.9", QueryResult::failed(Query::new("a", "y.com"), 1.0));

        let keys: Vec<&str> = results.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["9.9.9.9", "1.1.1.1"]);
        assert_eq!(results.0["9.9.9.9"].len(), 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_run_report_round_trip() {
        let mut results = RunResult::new();
        results.record(
            "8.8.8.8",
            QueryResult::answered(
                Query::new("a", "example.com"),
                vec!["93.184.216.34".to_string()],
                8.4,
                3600,
            ),
        );

        let report = RunReport {
            device_uuid: "f2b0c9e4-6f56-4e41-9d2b-1c2f4f5e6a7b".to_string(),
            device_tag: "lab".to_string(),
            host_name: "testhost".to_string(),
            script_utc_start_time: Utc::now(),
            script_utc_end_time: Utc::now(),
            data_format_version: DATA_FORMAT_VERSION,
            query_results: results,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"deviceUuid\""));
        assert!(json.contains("\"hostName\""));
        assert!(json.contains("\"scriptUTCStartTime\""));
        assert!(json.contains("\"dataFormatVersion\":2"));

        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
