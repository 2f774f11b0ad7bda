// src/verifier/http.rs
// =============================================================================
// This module fetches every finding and decides what is broken or stale.
//
// Key functionality:
// - One GET per finding, through a shared client, 24 at a time
// - Bare links: pass only on HTTP 200
// - Code-link pairs: additionally extract the claimed line range from the
//   response body and compare it, byte for byte, against the stored snippet
// - Diagnostics are printed as each outcome arrives; two booleans are
//   OR-folded across all outcomes for the closing summary
//
// One deliberate asymmetry, inherited from the tool this replaces: when a
// fetch fails at the connection level and the finding carries a snippet,
// the snippet is flagged stale as well. We cannot verify it, so we assume
// the worst.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Streams: buffer_unordered runs a bounded pool of futures
// - Single-consumer aggregation: no shared mutable state, no locks
// =============================================================================

use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::extract::{extract_lines, LineRange};
use crate::scanner::Finding;

// How many fetches run at once
//
// High enough to saturate a documentation-sized workload, low enough not
// to hammer the remote host or run out of file descriptors.
const MAX_WORKERS: usize = 24;

// Why a fetch produced no response at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// The request never yielded a status code (DNS, refused, timeout, ...)
    ConnectionFailed,
}

// Everything we learned about one finding
//
// Produced exactly once per finding, in completion order.
#[derive(Debug)]
pub struct VerificationOutcome {
    /// The finding this outcome belongs to
    pub finding: Finding,
    /// True only for a plain HTTP 200
    pub http_ok: bool,
    /// For code-link pairs: did the remote lines equal the stored snippet?
    /// None for bare links.
    pub code_matches: Option<bool>,
    /// The text extracted from the remote page, when extraction ran
    pub remote_code: Option<String>,
    /// Set when the fetch itself failed
    pub failure: Option<FetchFailure>,
}

// The two process-wide flags the summary is built from
//
// OR-folding is commutative and associative, so the completion order of
// the fetches can never change the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub any_link_error: bool,
    pub any_code_mismatch: bool,
}

impl Aggregate {
    pub fn record(&mut self, outcome: &VerificationOutcome) {
        if !outcome.http_ok {
            self.any_link_error = true;
        }
        if outcome.code_matches == Some(false) {
            self.any_code_mismatch = true;
        }
    }
}

// Verifies every finding and returns the outcomes plus the folded flags
//
// The stream is the worker pool: up to MAX_WORKERS fetches in flight, each
// task doing its own extraction and comparison after the response lands.
// This loop is the single consumer - it owns the aggregate and the printing,
// so nothing here needs a mutex.
pub async fn verify_findings(findings: Vec<Finding>) -> (Vec<VerificationOutcome>, Aggregate) {
    // One shared client: connection pooling across all fetches.
    // The 10 second timeout is a safety net; a hung fetch would otherwise
    // hold its worker slot forever.
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client");

    let tasks = findings.into_iter().map(|finding| {
        let client = client.clone(); // cheap, it's an Arc internally
        async move { verify_single(client, finding).await }
    });

    let mut outcomes = Vec::new();
    let mut aggregate = Aggregate::default();

    let mut completions = stream::iter(tasks).buffer_unordered(MAX_WORKERS);
    while let Some(outcome) = completions.next().await {
        report_outcome(&outcome);
        aggregate.record(&outcome);
        outcomes.push(outcome);
    }

    (outcomes, aggregate)
}

// Fetches one finding and runs whatever checks apply to it
//
// No retries: each finding is attempted exactly once. Failures are data,
// not errors - nothing here aborts the other findings.
async fn verify_single(client: Client, finding: Finding) -> VerificationOutcome {
    let response = match client.get(&finding.url).send().await {
        Ok(response) => response,
        Err(_) => {
            // Connection-level failure: no status code to inspect.
            // A snippet we cannot check is treated as stale.
            let code_matches = finding.is_code_link().then_some(false);
            return VerificationOutcome {
                finding,
                http_ok: false,
                code_matches,
                remote_code: None,
                failure: Some(FetchFailure::ConnectionFailed),
            };
        }
    };

    let http_ok = response.status() == StatusCode::OK;

    // The snippet check runs regardless of the status code: a 404 body is
    // still extracted, still compared, and reported on its own terms
    let (code_matches, remote_code) = match &finding.snippet {
        None => (None, None),
        Some(snippet) => match response.text().await {
            Err(_) => (Some(false), None),
            Ok(body) => match LineRange::from_link(&finding.url, snippet) {
                // No usable line anchor means no way to verify: stale
                None => (Some(false), None),
                Some(range) => {
                    let remote = extract_lines(&body, &range);
                    (Some(&remote == snippet), Some(remote))
                }
            },
        },
    };

    VerificationOutcome {
        finding,
        http_ok,
        code_matches,
        remote_code,
        failure: None,
    }
}

// Prints the per-finding diagnostics as outcomes arrive
//
// The three-part mismatch report (file, stored snippet, fetched snippet) is
// only printed when extraction actually produced remote text to diff.
fn report_outcome(outcome: &VerificationOutcome) {
    let file = outcome.finding.origin.display();

    if !outcome.http_ok {
        println!(
            "{}: ERROR FETCHING THE FOLLOWING LINK ---> {}",
            file, outcome.finding.url
        );
    }

    if outcome.code_matches == Some(false) {
        if let (Some(snippet), Some(remote)) = (&outcome.finding.snippet, &outcome.remote_code) {
            let sep = "-------------------------------------------------\n";
            println!("{}: CODE IS OUTDATED\n", file);
            println!("Code in {}:\n{}{}{}", file, sep, snippet, sep);
            println!("Code on the server:\n{}{}{}\n", sep, remote, sep);
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is buffer_unordered?
//    - Takes a stream of futures and keeps up to N of them running
//    - Yields results in completion order, not submission order
//    - It's our worker pool: no threads to manage, no queue to build
//
// 2. Why does the consumer loop own the aggregate?
//    - Every outcome flows through one `while let` loop on one task
//    - Folding the booleans there means no Mutex, no AtomicBool, and no
//      way to race - the compiler simply never shares the state
//
// 3. What is .then_some()?
//    - bool::then_some(v) gives Some(v) when true, None when false
//    - A compact way to attach a value only in one case
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn bare_link(url: &str) -> Finding {
        Finding {
            url: url.to_string(),
            origin: PathBuf::from("doc.md"),
            snippet: None,
        }
    }

    fn code_link(url: &str, snippet: &str) -> Finding {
        Finding {
            url: url.to_string(),
            origin: PathBuf::from("doc.md"),
            snippet: Some(snippet.to_string()),
        }
    }

    fn outcome(
        finding: Finding,
        http_ok: bool,
        code_matches: Option<bool>,
    ) -> VerificationOutcome {
        VerificationOutcome {
            finding,
            http_ok,
            code_matches,
            remote_code: None,
            failure: None,
        }
    }

    #[test]
    fn test_mismatch_sets_the_code_flag() {
        let mut aggregate = Aggregate::default();
        aggregate.record(&outcome(
            code_link("http://x#L1", "foo\nbar\n"),
            true,
            Some(false),
        ));
        assert!(!aggregate.any_link_error);
        assert!(aggregate.any_code_mismatch);
    }

    #[test]
    fn test_matching_code_sets_nothing() {
        let mut aggregate = Aggregate::default();
        aggregate.record(&outcome(code_link("http://x#L1", "foo\n"), true, Some(true)));
        assert_eq!(aggregate, Aggregate::default());
    }

    #[test]
    fn test_http_error_sets_the_link_flag_only() {
        let mut aggregate = Aggregate::default();
        aggregate.record(&outcome(bare_link("http://x"), false, None));
        assert!(aggregate.any_link_error);
        assert!(!aggregate.any_code_mismatch);
    }

    #[test]
    fn test_connection_failure_on_a_code_link_flags_both() {
        // An unreachable snippet cannot be verified, so it counts as stale
        // on top of the link error
        let failed = VerificationOutcome {
            finding: code_link("http://unreachable#L1", "foo\n"),
            http_ok: false,
            code_matches: Some(false),
            remote_code: None,
            failure: Some(FetchFailure::ConnectionFailed),
        };
        assert_eq!(failed.failure, Some(FetchFailure::ConnectionFailed));

        let mut aggregate = Aggregate::default();
        aggregate.record(&failed);
        assert!(aggregate.any_link_error);
        assert!(aggregate.any_code_mismatch);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let make = || {
            vec![
                outcome(bare_link("http://a"), true, None),
                outcome(bare_link("http://b"), false, None),
                outcome(code_link("http://c#L1", "x\n"), true, Some(true)),
                outcome(code_link("http://d#L1", "y\n"), true, Some(false)),
            ]
        };

        // Fold the same outcomes in several arrival orders
        let orders: [[usize; 4]; 4] =
            [[0, 1, 2, 3], [3, 2, 1, 0], [1, 3, 0, 2], [2, 0, 3, 1]];

        let mut results = Vec::new();
        for order in orders {
            let outcomes = make();
            let mut aggregate = Aggregate::default();
            for i in order {
                aggregate.record(&outcomes[i]);
            }
            results.push(aggregate);
        }

        assert!(results.iter().all(|a| *a == results[0]));
        assert!(results[0].any_link_error);
        assert!(results[0].any_code_mismatch);
    }

    #[tokio::test]
    async fn test_empty_workload_is_a_no_op() {
        // No findings: no fetches are dispatched and the flags stay clean
        let (outcomes, aggregate) = verify_findings(Vec::new()).await;
        assert!(outcomes.is_empty());
        assert_eq!(aggregate, Aggregate::default());
    }
}
