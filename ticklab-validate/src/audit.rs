//! Temporal leakage auditing of walk-forward splits.
//!
//! The auditor inspects a generated split set and reports violations instead
//! of assuming the generator is correct. It never fails and never panics, so
//! it is safe to run as a non-fatal pre-flight check; the caller inspects the
//! reports and decides what to do.

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use ticklab_core::domain::Bar;

use crate::splitter::{IndexRange, SplitSpec};

/// Kinds of leakage findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A split's train and test ranges overlap each other.
    TrainTestOverlap,
    /// A split's test range reappears as train data in a later split.
    ///
    /// Expected for rolling/expanding configs whose step is smaller than the
    /// train window; reported so the caller can decide whether window reuse
    /// is acceptable for the model at hand.
    TestReuse,
    /// A split boundary falls strictly inside a trading session instead of
    /// at a session edge.
    SessionBoundary,
}

/// One leakage finding, naming the offending split pair and the overlapping
/// index range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeakageIssue {
    pub kind: IssueKind,
    pub split_id: usize,
    /// The later split involved, for cross-split findings.
    pub other_split_id: Option<usize>,
    pub overlap: IndexRange,
}

/// Audit result for one split. Produced for every split, empty or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeakageReport {
    pub split_id: usize,
    pub has_leakage: bool,
    pub issues: Vec<LeakageIssue>,
}

impl LeakageReport {
    fn from_issues(split_id: usize, issues: Vec<LeakageIssue>) -> Self {
        Self {
            split_id,
            has_leakage: !issues.is_empty(),
            issues,
        }
    }
}

/// Audit a split set for index-level leakage: train/test self-overlap and
/// test-range reuse by later train windows. One report per split, in split
/// order.
pub fn audit(splits: &[SplitSpec]) -> Vec<LeakageReport> {
    splits
        .iter()
        .enumerate()
        .map(|(i, split)| {
            let mut issues = Vec::new();

            if let Some(overlap) = split.train.intersection(&split.test) {
                issues.push(LeakageIssue {
                    kind: IssueKind::TrainTestOverlap,
                    split_id: split.split_id,
                    other_split_id: None,
                    overlap,
                });
            }

            for later in &splits[i + 1..] {
                if let Some(overlap) = later.train.intersection(&split.test) {
                    issues.push(LeakageIssue {
                        kind: IssueKind::TestReuse,
                        split_id: split.split_id,
                        other_split_id: Some(later.split_id),
                        overlap,
                    });
                }
            }

            LeakageReport::from_issues(split.split_id, issues)
        })
        .collect()
}

/// Trading session bounds in UTC hours, `[open_hour, close_hour)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionClock {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl SessionClock {
    /// Whether a bar's open timestamp falls inside the session.
    fn in_session(&self, bar: &Bar) -> bool {
        match bar.open_time() {
            Some(dt) => {
                let hour = dt.hour();
                hour >= self.open_hour && hour < self.close_hour
            }
            None => false,
        }
    }
}

/// Session-aware audit: index-level checks plus a boundary check that flags
/// split edges cutting through a trading session.
///
/// A boundary at index `b` is inside a session when bars `b - 1` and `b` are
/// both in session on the same UTC date; a clean split boundary coincides
/// with a session edge.
pub fn audit_sessions(
    splits: &[SplitSpec],
    bars: &[Bar],
    clock: &SessionClock,
) -> Vec<LeakageReport> {
    let mut reports = audit(splits);

    for (report, split) in reports.iter_mut().zip(splits) {
        for boundary in [split.test.start, split.test.end] {
            if boundary_inside_session(boundary, bars, clock) {
                report.issues.push(LeakageIssue {
                    kind: IssueKind::SessionBoundary,
                    split_id: split.split_id,
                    other_split_id: None,
                    overlap: IndexRange::new(boundary - 1, boundary + 1),
                });
            }
        }
        report.has_leakage = !report.issues.is_empty();
    }

    reports
}

fn boundary_inside_session(boundary: usize, bars: &[Bar], clock: &SessionClock) -> bool {
    if boundary == 0 || boundary >= bars.len() {
        return false;
    }
    let before = &bars[boundary - 1];
    let after = &bars[boundary];
    if !clock.in_session(before) || !clock.in_session(after) {
        return false;
    }
    match (before.open_time(), after.open_time()) {
        (Some(a), Some(b)) => a.date_naive() == b.date_naive(),
        _ => false,
    }
}
