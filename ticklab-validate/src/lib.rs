//! TickLab Validate — walk-forward splitting and leakage auditing.
//!
//! This crate sits downstream of the labeling engine:
//! - Lazy walk-forward train/test split generation (rolling and expanding)
//! - Leakage auditing that reports findings instead of failing
//! - Split manifests with a deterministic config fingerprint

pub mod audit;
pub mod manifest;
pub mod splitter;

pub use audit::{audit, audit_sessions, IssueKind, LeakageIssue, LeakageReport, SessionClock};
pub use manifest::{SplitManifest, SplitRecord};
pub use splitter::{
    generate_splits, IndexRange, InvalidSplitConfig, Period, SplitConfig, SplitMode, SplitSpec,
    WalkForward,
};
