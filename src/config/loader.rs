//! Input list loader.
//!
//! This module loads nameserver and query lists from local text files or
//! HTTP(S) URLs. One entry per line; query lines optionally carry an explicit
//! record type as `name,TYPE`.

use crate::dns::types::Query;
use crate::error::{Error, Result};
use std::path::Path;

/// Loader for nameserver and query input lists.
///
/// Sources are plain text, one entry per line. A source is treated as a URL
/// when it starts with an `http://` or `https://` scheme, and as a local
/// filesystem path otherwise.
pub struct InputLoader;

impl InputLoader {
    /// Load an input list as trimmed, non-empty lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a local path does not exist or cannot be
    /// read, and [`Error::Fetch`] if a URL source cannot be retrieved. A
    /// fetch failure is surfaced as an error rather than substituted into
    /// the list, so a dead URL never turns into a bogus lookup target.
    pub async fn load_lines(source: &str) -> Result<Vec<String>> {
        if is_url(source) {
            Self::fetch_remote(source).await
        } else {
            Self::read_local(source)
        }
    }

    /// Load a query list, parsing each line as `name` or `name,TYPE`.
    ///
    /// Parsing is purely syntactic: the record type string is lowercased and
    /// stored as-is. An unsupported type is only rejected by the resolution
    /// engine when the query is dispatched.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::load_lines`].
    pub async fn load_queries(source: &str) -> Result<Vec<Query>> {
        let lines = Self::load_lines(source).await?;
        Ok(lines.iter().map(|line| parse_query_line(line)).collect())
    }

    /// Read a local input file into trimmed, non-empty lines.
    fn read_local(path: &str) -> Result<Vec<String>> {
        if !Path::new(path).exists() {
            return Err(Error::config(format!("cannot find file {path}")));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read file {path}: {e}")))?;
        Ok(split_lines(&content))
    }

    /// Fetch a remote input list via HTTP GET.
    async fn fetch_remote(url: &str) -> Result<Vec<String>> {
        let response = reqwest::get(url)
            .await
            .map_err(|e| Error::fetch(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(format!("GET {url} returned status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("reading body of {url} failed: {e}")))?;
        Ok(split_lines(&body))
    }
}

/// Check whether a source identifier is an HTTP(S) URL.
#[must_use]
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Split text into trimmed lines, dropping empty ones.
fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse one query-list line.
///
/// `example.com` parses as an A query; `example.com,MX` carries an explicit
/// type. Everything after the first comma is the type string.
#[must_use]
pub fn parse_query_line(line: &str) -> Query {
    match line.split_once(',') {
        Some((name, record)) => Query::new(record.trim(), name.trim()),
        None => Query::new("a", line.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_query_line_default_type() {
        let query = parse_query_line("example.com");
        assert_eq!(query.record, "a");
        assert_eq!(query.name, "example.com");
    }

    #[test]
    fn test_parse_query_line_explicit_type() {
        let query = parse_query_line("example.com,MX");
        assert_eq!(query.record, "mx");
        assert_eq!(query.name, "example.com");
    }

    #[test]
    fn test_parse_query_line_trims_whitespace() {
        let query = parse_query_line("example.com , ns ");
        assert_eq!(query.record, "ns");
        assert_eq!(query.name, "example.com");
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/list.txt"));
        assert!(is_url("http://example.com/list.txt"));
        assert!(!is_url("nameservers.txt"));
        assert!(!is_url("/etc/dnsperf/queries.txt"));
    }

    #[tokio::test]
    async fn test_load_lines_missing_file_is_config_error() {
        let err = InputLoader::load_lines("definitely-not-here.txt")
            .await
            .unwrap_err();
        assert!(err.is_fatal_config());
    }

    #[tokio::test]
    async fn test_load_lines_drops_empty_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "8.8.8.8").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  1.1.1.1  ").unwrap();
        writeln!(file).unwrap();

        let lines = InputLoader::load_lines(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(lines, ["8.8.8.8", "1.1.1.1"]);
    }

    #[tokio::test]
    async fn test_load_queries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "example.com").unwrap();
        writeln!(file, "example.com,MX").unwrap();
        writeln!(file, "8.8.8.8,PTR").unwrap();

        let queries = InputLoader::load_queries(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(queries.len(), 3);
        assert_eq!(queries[0], Query::new("a", "example.com"));
        assert_eq!(queries[1], Query::new("mx", "example.com"));
        assert_eq!(queries[2], Query::new("ptr", "8.8.8.8"));
    }
}
