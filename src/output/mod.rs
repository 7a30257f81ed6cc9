//! Result sinks.
//!
//! Adapters that consume a finished [`RunReport`]: JSON file writer, stdout
//! printer, console table, HTTP uploader, and the JSON-batch to CSV
//! converter used for spreadsheet analysis.

use crate::dns::types::{RunReport, RunResult};
use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Write a report to a file as one compact JSON line, overwriting.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_report_file(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string(report)?;
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{json}")?;
    Ok(())
}

/// Print a report to stdout as compact JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_report(report: &RunReport) -> Result<()> {
    println!("{}", serde_json::to_string(report)?);
    Ok(())
}

/// POST a report as JSON to an upload endpoint.
///
/// Returns the response headers so the caller can inspect them.
///
/// # Errors
///
/// Returns [`Error::Upload`] if the request fails or the server answers
/// with a non-success status.
pub async fn upload_report(report: &RunReport, url: &str) -> Result<HeaderMap> {
    let body = serde_json::to_string(report)?;
    let client = reqwest::Client::new();

    let response = client
        .post(url)
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| Error::upload(format!("POST {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::upload(format!("POST {url} returned status {status}")));
    }

    Ok(response.headers().clone())
}

/// Print run results as an aligned console table.
///
/// Column widths are computed from the result set at hand.
pub fn display_table(results: &RunResult) {
    let mut server_width = "DNS Server".len();
    let mut query_width = "DNS Query".len();
    let mut response_width = "DNS Response".len();

    let rows: Vec<(&str, String, String, String, i64)> = results
        .iter()
        .flat_map(|(server, entries)| {
            entries.iter().map(move |entry| {
                (
                    server.as_str(),
                    format!("{} ({})", entry.query.name, entry.query.record),
                    entry.response.join(","),
                    format!("{:.1}", entry.response_time_ms),
                    entry.ttl,
                )
            })
        })
        .collect();

    for (server, query, response, _, _) in &rows {
        server_width = server_width.max(server.len());
        query_width = query_width.max(query.len());
        response_width = response_width.max(response.len());
    }

    println!(
        "{:<server_width$}  {:<query_width$}  {:<response_width$}  {:>18}  {:>6}",
        "DNS Server", "DNS Query", "DNS Response", "Response Time (ms)", "TTL"
    );
    println!(
        "{}",
        "-".repeat(server_width + query_width + response_width + 32)
    );

    for (server, query, response, time, ttl) in &rows {
        println!(
            "{server:<server_width$}  {query:<query_width$}  {response:<response_width$}  {time:>18}  {ttl:>6}"
        );
    }
}

/// Convert a JSON-lines batch file of reports into a CSV spreadsheet.
///
/// Each line of the input file is one serialized [`RunReport`]; every
/// (report, nameserver, query) combination becomes one CSV row. Returns the
/// number of reports converted.
///
/// # Errors
///
/// Returns [`Error::Config`] if the input file is missing, and a parse or
/// I/O error if a line cannot be decoded or the output cannot be written.
pub fn convert_batches(json_path: &Path, csv_path: &Path) -> Result<usize> {
    if !json_path.exists() {
        return Err(Error::config(format!(
            "cannot find file {}",
            json_path.display()
        )));
    }

    let input = BufReader::new(std::fs::File::open(json_path)?);
    let mut output = std::fs::File::create(csv_path)?;

    // The query name and record type get unambiguous headers of their own;
    // older sheets labeled these columns "Query" and "Record" but filled
    // them with the type and the name respectively.
    writeln!(
        output,
        "deviceUuid,hostName,deviceTag,scriptUTCStartTime,scriptUTCEndTime,nameserver,queryName,recordType,response,responseTime"
    )?;

    let mut reports = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let report: RunReport = serde_json::from_str(&line)?;
        for (server, entries) in report.query_results.iter() {
            for entry in entries {
                writeln!(
                    output,
                    "{},{},{},{},{},{},{},{},{},{:.1}",
                    csv_field(&report.device_uuid),
                    csv_field(&report.host_name),
                    csv_field(&report.device_tag),
                    report.script_utc_start_time,
                    report.script_utc_end_time,
                    csv_field(server),
                    csv_field(&entry.query.name),
                    csv_field(&entry.query.record),
                    csv_field(&entry.response.join(",")),
                    entry.response_time_ms
                )?;
            }
        }
        reports += 1;
    }

    Ok(reports)
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::report::{aggregate, Identity};
    use crate::dns::types::{Query, QueryResult};
    use chrono::Utc;

    fn sample_report() -> RunReport {
        let mut results = RunResult::new();
        results.record(
            "8.8.8.8",
            QueryResult::answered(
                Query::new("a", "example.com"),
                vec!["93.184.216.34".to_string(), "93.184.216.35".to_string()],
                12.3,
                3600,
            ),
        );
        results.record(
            "8.8.8.8",
            QueryResult::failed(Query::new("mx", "nosuchdomain.invalid"), 4.0),
        );

        let identity = Identity {
            uuid: "7c9e6679-7425-40de-944b-e07fc1f90ae7".to_string(),
            tag: "lab".to_string(),
            hostname: "testhost".to_string(),
        };
        aggregate(results, Utc::now(), Utc::now(), &identity)
    }

    #[test]
    fn test_write_report_file_round_trip() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");

        write_report_file(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        let back: RunReport = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_convert_batches() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("batches.txt");
        let csv_path = dir.path().join("out.csv");

        // Two accumulated batches, one per line.
        let line = serde_json::to_string(&report).unwrap();
        std::fs::write(&json_path, format!("{line}\n{line}\n")).unwrap();

        let reports = convert_batches(&json_path, &csv_path).unwrap();
        assert_eq!(reports, 2);

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        // Header plus 2 result rows per batch.
        assert_eq!(lines.len(), 1 + 4);
        assert_eq!(
            lines[0],
            "deviceUuid,hostName,deviceTag,scriptUTCStartTime,scriptUTCEndTime,nameserver,queryName,recordType,response,responseTime"
        );
        // The name lands under queryName and the type under recordType.
        assert!(lines[1].contains("8.8.8.8,example.com,a,"));
        assert!(lines[2].contains("8.8.8.8,nosuchdomain.invalid,mx,"));
        // Multi-answer responses are quoted.
        assert!(lines[1].contains("\"93.184.216.34,93.184.216.35\""));
        assert!(lines[2].contains("Err"));
    }

    #[test]
    fn test_convert_missing_input_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert_batches(&dir.path().join("absent.txt"), &dir.path().join("out.csv"))
            .unwrap_err();
        assert!(err.is_fatal_config());
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
