//! Resolution engine.
//!
//! This module runs the cross product of nameservers and queries: one lookup
//! per (nameserver, query) pair, directed at that nameserver only, with the
//! elapsed wall-clock time recorded per lookup. Failures are classified,
//! logged, and recorded as sentinel results; they never abort the run.

use crate::dns::types::{Query, QueryResult, RecordKind, RunResult};
use crate::error::{Error, Result};
use std::net::IpAddr;
use std::time::{Duration, Instant};
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::lookup::Lookup;
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::proto::rr::RData;
use trust_dns_resolver::TokioAsyncResolver;

/// Default timeout for each lookup in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Why a single lookup produced no usable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The server answered but returned no records of the requested type
    NoAnswer,
    /// The lookup timed out
    Timeout,
    /// The name does not exist
    Nxdomain,
    /// No nameserver could be reached
    NoNameservers,
    /// The query carries a record type this tool does not support
    UnknownType,
    /// A PTR query name that is not a parseable IP address
    BadAddress,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoAnswer => "no answer",
            Self::Timeout => "timeout",
            Self::Nxdomain => "NXDOMAIN",
            Self::NoNameservers => "no nameservers reachable",
            Self::UnknownType => "unknown record type",
            Self::BadAddress => "not a valid address for reverse lookup",
        };
        write!(f, "{s}")
    }
}

/// Classify a resolver error into the failure taxonomy.
#[must_use]
pub fn classify(error: &ResolveError) -> Failure {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                Failure::Nxdomain
            } else {
                Failure::NoAnswer
            }
        }
        ResolveErrorKind::Timeout => Failure::Timeout,
        _ => Failure::NoNameservers,
    }
}

/// Sequential DNS query runner.
///
/// Resolves every query against every nameserver, one lookup at a time,
/// in input order. Each nameserver gets its own resolver configured with
/// that single server and no fallback, so an unresponsive nameserver shows
/// up in the results instead of being masked by failover.
///
/// # Example
///
/// ```ignore
/// let runner = QueryRunner::new();
/// let results = runner.run(&nameservers, &queries).await;
/// ```
pub struct QueryRunner {
    timeout: Duration,
}

impl QueryRunner {
    /// Create a runner with the default per-lookup timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a runner with a custom per-lookup timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Resolve every query against every nameserver.
    ///
    /// The returned map has one key per nameserver, in input order, each
    /// holding exactly one result per query, in query order. A nameserver
    /// that cannot be set up at all still gets a full column of sentinel
    /// results so the cross product stays intact.
    pub async fn run(&self, nameservers: &[String], queries: &[Query]) -> RunResult {
        let mut results = RunResult::new();
        let mut counter: usize = 1;

        for server in nameservers {
            // A setup failure is remembered and reported once per query, so
            // every sentinel recorded below has a log line naming both the
            // query and the nameserver.
            let resolver = self.resolver_for(server).await.map_err(|e| e.to_string());

            for query in queries {
                tracing::debug!(
                    "query {counter}: {} {} @ {server}",
                    query.record,
                    query.name
                );

                let result = match &resolver {
                    Ok(resolver) => self.resolve_one(resolver, server, query).await,
                    Err(reason) => {
                        tracing::warn!(
                            "query {} {} against {server} failed: {reason}",
                            query.record,
                            query.name
                        );
                        QueryResult::failed(query.clone(), 0.0)
                    }
                };
                results.record(server, result);
                counter += 1;
            }
        }

        results
    }

    /// Resolve one query against one nameserver, timing the lookup.
    async fn resolve_one(
        &self,
        resolver: &TokioAsyncResolver,
        server: &str,
        query: &Query,
    ) -> QueryResult {
        let started = Instant::now();
        let outcome = lookup_query(resolver, query).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok((response, ttl)) => QueryResult::answered(query.clone(), response, elapsed_ms, ttl),
            Err(failure) => {
                tracing::warn!(
                    "query {} {} against {server} failed: {failure}",
                    query.record,
                    query.name
                );
                QueryResult::failed(query.clone(), elapsed_ms)
            }
        }
    }

    /// Build a resolver that talks to a single nameserver only.
    ///
    /// The nameserver may be an IP address or a hostname; hostnames are
    /// resolved once through the system resolver before the run.
    async fn resolver_for(&self, nameserver: &str) -> Result<TokioAsyncResolver> {
        let ip = match nameserver.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => resolve_nameserver_host(nameserver, self.timeout).await?,
        };

        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(&[ip], 53, true),
        );

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        // No retransmits: a slow or dead server is recorded, not retried.
        opts.attempts = 0;
        // Lookups must hit the wire, not /etc/hosts.
        opts.use_hosts_file = false;

        Ok(TokioAsyncResolver::tokio(config, opts)?)
    }
}

impl Default for QueryRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a nameserver given as a hostname to its first IP address.
///
/// Bounded by the runner's per-lookup timeout so a dead system resolver
/// cannot stall the run setup.
async fn resolve_nameserver_host(host: &str, timeout: Duration) -> Result<IpAddr> {
    let (config, mut opts) = trust_dns_resolver::system_conf::read_system_conf()?;
    opts.timeout = timeout;
    opts.attempts = 0;
    let system = TokioAsyncResolver::tokio(config, opts)?;
    let lookup = system.lookup_ip(host).await?;
    lookup
        .iter()
        .next()
        .ok_or_else(|| Error::parse(format!("nameserver {host} did not resolve to an address")))
}

/// Dispatch one lookup and render its answers.
async fn lookup_query(
    resolver: &TokioAsyncResolver,
    query: &Query,
) -> std::result::Result<(Vec<String>, i64), Failure> {
    let kind = query.kind().map_err(|_| Failure::UnknownType)?;

    let lookup = match kind {
        RecordKind::Ptr => {
            let ip: IpAddr = query.name.parse().map_err(|_| Failure::BadAddress)?;
            let reverse = resolver
                .reverse_lookup(ip)
                .await
                .map_err(|e| classify(&e))?;
            reverse.as_lookup().clone()
        }
        _ => resolver
            .lookup(query.name.as_str(), kind.record_type())
            .await
            .map_err(|e| classify(&e))?,
    };

    let (response, ttl) = render_answers(&lookup, kind);
    if response.is_empty() {
        // The lookup succeeded but carried no records of the requested type
        // (e.g. a bare CNAME chain).
        return Err(Failure::NoAnswer);
    }
    Ok((response, ttl))
}

/// Render all answer records matching the requested kind, with the
/// answer set's TTL taken from the first matching record.
fn render_answers(lookup: &Lookup, kind: RecordKind) -> (Vec<String>, i64) {
    let mut response = Vec::new();
    let mut ttl: Option<i64> = None;

    for record in lookup.record_iter() {
        let Some(data) = record.data() else { continue };
        if let Some(text) = render_rdata(data, kind) {
            if ttl.is_none() {
                ttl = Some(i64::from(record.ttl()));
            }
            response.push(text);
        }
    }

    (response, ttl.unwrap_or(crate::dns::types::TTL_SENTINEL))
}

/// Textual rendering of one answer record, per record type.
///
/// Returns `None` for records that do not match the requested kind, which
/// filters CNAME chain entries out of address lookups.
fn render_rdata(data: &RData, kind: RecordKind) -> Option<String> {
    match (kind, data) {
        (RecordKind::A, RData::A(addr)) => Some(addr.to_string()),
        (RecordKind::Aaaa, RData::AAAA(addr)) => Some(addr.to_string()),
        (RecordKind::Mx, RData::MX(mx)) => Some(format!("{} {}", mx.preference(), mx.exchange())),
        (RecordKind::Ptr, RData::PTR(name)) => Some(name.to_string()),
        (RecordKind::Cname, RData::CNAME(name)) => Some(name.to_string()),
        (RecordKind::Ns, RData::NS(name)) => Some(name.to_string()),
        // Only the primary-nameserver token of the SOA record is reported.
        (RecordKind::Soa, RData::SOA(soa)) => Some(soa.mname().to_string()),
        _ => None,
    }
}
