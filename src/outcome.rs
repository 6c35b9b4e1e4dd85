//! Terminal state of a traversal and its console summary.

use crate::page::PageRef;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

const SEPARATOR: &str = "-------------------------------------------";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TraversalStatus {
    /// The current page equals the target.
    TargetReached,
    /// A page offered no admissible candidate.
    NoValidLink,
    /// A page could not be retrieved.
    FetchFailed {
        /// Rendered fetch error.
        reason: String,
    },
    /// The configured hop ceiling was hit first.
    HopLimitReached {
        /// Configured ceiling.
        limit: usize,
    },
}

/// Final record of one run.
#[derive(Debug, Clone)]
pub struct TraversalOutcome {
    /// Terminal status.
    pub status: TraversalStatus,
    /// Wall-clock time from start to the terminal transition.
    pub elapsed: Duration,
    /// Accepted hops.
    pub hops: usize,
    /// Page the run stopped on.
    pub final_page: PageRef,
    /// Final page as an absolute URL.
    pub final_url: String,
    /// Resolved URL of every accepted hop, in order.
    pub path: Vec<String>,
}

impl TraversalOutcome {
    /// True when the run ended on the target.
    pub fn reached_target(&self) -> bool {
        self.status == TraversalStatus::TargetReached
    }

    /// Elapsed time divided by hops; zero when no hop was taken.
    pub fn average_per_hop(&self) -> Duration {
        match u32::try_from(self.hops) {
            Ok(0) => Duration::ZERO,
            Ok(hops) => self.elapsed / hops,
            Err(_) => Duration::from_secs_f64(self.elapsed.as_secs_f64() / self.hops as f64),
        }
    }

    /// Writes the human-readable summary.
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.status {
            TraversalStatus::FetchFailed { reason } => writeln!(out, "Request failed: {reason}")?,
            TraversalStatus::NoValidLink => writeln!(out, "No valid link found.")?,
            TraversalStatus::HopLimitReached { limit } => {
                writeln!(out, "Hop limit of {limit} reached.")?
            }
            TraversalStatus::TargetReached => {}
        }

        if self.reached_target() {
            writeln!(out, "\nTarget reached!")?;
        } else {
            writeln!(out, "\nTarget not reached.")?;
        }

        writeln!(out, "{SEPARATOR}")?;
        writeln!(
            out,
            "Overall Time: {:.2} seconds",
            self.elapsed.as_secs_f64()
        )?;
        writeln!(out, "Total Links Visited: {} links", self.hops)?;
        writeln!(
            out,
            "Average Time per Link: {:.2} seconds",
            self.average_per_hop().as_secs_f64()
        )?;
        writeln!(out, "Current Page: {}", self.final_url)?;
        writeln!(out, "Links Traversed: ")?;
        for url in &self.path {
            writeln!(out, "{url}")?;
        }
        Ok(())
    }

    /// Machine-readable summary.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        let summary = Summary {
            status: &self.status,
            elapsed_secs: self.elapsed.as_secs_f64(),
            hops: self.hops,
            average_secs_per_hop: self.average_per_hop().as_secs_f64(),
            final_page: &self.final_page,
            final_url: &self.final_url,
            path: &self.path,
        };
        serde_json::to_value(summary)
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    #[serde(flatten)]
    status: &'a TraversalStatus,
    elapsed_secs: f64,
    hops: usize,
    average_secs_per_hop: f64,
    final_page: &'a PageRef,
    final_url: &'a str,
    path: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: TraversalStatus, hops: usize, elapsed: Duration) -> TraversalOutcome {
        TraversalOutcome {
            status,
            elapsed,
            hops,
            final_page: PageRef::from_href("/wiki/Potato"),
            final_url: "https://en.wikipedia.org/wiki/Potato".to_string(),
            path: Vec::new(),
        }
    }

    #[test]
    fn average_is_zero_without_hops() {
        let o = outcome(TraversalStatus::TargetReached, 0, Duration::from_secs(3));
        assert_eq!(o.average_per_hop(), Duration::ZERO);
    }

    #[test]
    fn average_divides_elapsed_by_hops() {
        let o = outcome(TraversalStatus::TargetReached, 4, Duration::from_secs(2));
        assert_eq!(o.average_per_hop(), Duration::from_millis(500));
    }

    #[test]
    fn fetch_failure_report_leads_with_reason() {
        let o = outcome(
            TraversalStatus::FetchFailed {
                reason: "503 Service Unavailable".to_string(),
            },
            0,
            Duration::from_millis(120),
        );
        let mut buf = Vec::new();
        o.write_report(&mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("Request failed: 503 Service Unavailable\n"));
        assert!(text.contains("Target not reached."));
        assert!(text.contains("Overall Time: 0.12 seconds"));
        assert!(text.contains("Total Links Visited: 0 links"));
        assert!(text.contains("Average Time per Link: 0.00 seconds"));
        assert!(text.contains("Current Page: https://en.wikipedia.org/wiki/Potato"));
    }

    #[test]
    fn success_report_lists_path() {
        let mut o = outcome(TraversalStatus::TargetReached, 2, Duration::from_secs(1));
        o.path = vec![
            "https://en.wikipedia.org/wiki/United_States".to_string(),
            "https://en.wikipedia.org/wiki/Barack_Obama".to_string(),
        ];
        let mut buf = Vec::new();
        o.write_report(&mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("\nTarget reached!\n"));
        assert!(text.ends_with(
            "Links Traversed: \nhttps://en.wikipedia.org/wiki/United_States\nhttps://en.wikipedia.org/wiki/Barack_Obama\n"
        ));
    }

    #[test]
    fn json_summary_flattens_status() {
        let o = outcome(TraversalStatus::HopLimitReached { limit: 5 }, 5, Duration::from_secs(5));
        let json = o.to_json().expect("summary serializes");
        assert_eq!(json["status"], "hop_limit_reached");
        assert_eq!(json["limit"], 5);
        assert_eq!(json["hops"], 5);
        assert_eq!(json["final_page"], "/wiki/Potato");
        assert_eq!(json["average_secs_per_hop"], 1.0);
    }
}
