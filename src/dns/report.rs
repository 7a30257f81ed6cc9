//! Run report assembly.
//!
//! Pure assembly of the output envelope: no I/O happens here. Identity
//! state is created by the entry point before the run; this module only
//! copies the snapshot it is handed.

use crate::dns::types::{RunReport, RunResult, DATA_FORMAT_VERSION};
use chrono::{DateTime, Utc};

/// Snapshot of the device identity attached to a report.
///
/// Produced by the identity store; empty strings mean the corresponding
/// value was never set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Persistent device UUID
    pub uuid: String,
    /// User-assigned tag
    pub tag: String,
    /// Hostname of this machine
    pub hostname: String,
}

/// Wrap a finished run in its report envelope.
#[must_use]
pub fn aggregate(
    results: RunResult,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    identity: &Identity,
) -> RunReport {
    RunReport {
        device_uuid: identity.uuid.clone(),
        device_tag: identity.tag.clone(),
        host_name: identity.hostname.clone(),
        script_utc_start_time: start,
        script_utc_end_time: end,
        data_format_version: DATA_FORMAT_VERSION,
        query_results: results,
    }
}
