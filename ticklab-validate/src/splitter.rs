//! Walk-forward split generation.
//!
//! Produces train/test index windows over a time-ordered dataset. Rolling
//! mode slides a fixed-width train window; expanding mode grows the train
//! window from index 0. Splits are generated lazily from the loop index
//! alone, so the sequence is restartable and memory use stays bounded on
//! long series.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ticklab_core::domain::Bar;

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &IndexRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The overlapping sub-range, if any.
    pub fn intersection(&self, other: &IndexRange) -> Option<IndexRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(IndexRange { start, end })
        } else {
            None
        }
    }
}

/// How the train window evolves across splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Fixed-width train window sliding forward by `step_size`.
    Rolling,
    /// Train window anchored at index 0, growing by `step_size` per split.
    Expanding,
}

/// Walk-forward configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplitConfig {
    pub train_size: usize,
    pub test_size: usize,
    pub step_size: usize,
    pub mode: SplitMode,
}

/// Degenerate or oversized split windows.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSplitConfig {
    #[error("train_size, test_size and step_size must all be positive")]
    ZeroSize,

    #[error("train_size {train_size} + test_size {test_size} exceeds the index domain of {n_indices}")]
    DomainTooSmall {
        train_size: usize,
        test_size: usize,
        n_indices: usize,
    },
}

/// Calendar boundaries of an index range, taken from the bar table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Open of the range's first bar, nanoseconds since the Unix epoch.
    pub start_ns: i64,
    /// Close of the range's last bar (exclusive boundary).
    pub end_ns: i64,
}

impl Period {
    fn from_range(range: &IndexRange, bars: &[Bar]) -> Option<Period> {
        let first = bars.get(range.start)?;
        let last = bars.get(range.end.checked_sub(1)?)?;
        Some(Period {
            start_ns: first.t_open_ns,
            end_ns: last.t_close_ns,
        })
    }
}

/// One train/test window pair. Immutable once generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSpec {
    pub split_id: usize,
    pub mode: SplitMode,
    pub train: IndexRange,
    pub test: IndexRange,
    /// Calendar boundaries, filled by `with_calendar`.
    pub train_period: Option<Period>,
    pub test_period: Option<Period>,
}

impl SplitSpec {
    /// Derive calendar boundaries from the bar table backing the index
    /// domain.
    pub fn with_calendar(mut self, bars: &[Bar]) -> Self {
        self.train_period = Period::from_range(&self.train, bars);
        self.test_period = Period::from_range(&self.test, bars);
        self
    }
}

/// Lazy walk-forward split sequence.
///
/// Each split is computed from the loop index alone; the iterator is `Clone`
/// and restartable. Generation stops once the test window would run past the
/// index domain — a truncated final split is excluded, never emitted short.
#[derive(Debug, Clone)]
pub struct WalkForward {
    n_indices: usize,
    config: SplitConfig,
    next_id: usize,
}

impl WalkForward {
    pub fn new(n_indices: usize, config: SplitConfig) -> Result<Self, InvalidSplitConfig> {
        if config.train_size == 0 || config.test_size == 0 || config.step_size == 0 {
            return Err(InvalidSplitConfig::ZeroSize);
        }
        if config.train_size + config.test_size > n_indices {
            return Err(InvalidSplitConfig::DomainTooSmall {
                train_size: config.train_size,
                test_size: config.test_size,
                n_indices,
            });
        }
        Ok(Self {
            n_indices,
            config,
            next_id: 0,
        })
    }

    /// The split at position `i` of the sequence, or `None` past the end.
    fn split_at(&self, i: usize) -> Option<SplitSpec> {
        let c = &self.config;
        let train = match c.mode {
            SplitMode::Rolling => IndexRange::new(i * c.step_size, i * c.step_size + c.train_size),
            SplitMode::Expanding => IndexRange::new(0, i * c.step_size + c.train_size),
        };
        let test = IndexRange::new(train.end, train.end + c.test_size);
        if test.end > self.n_indices {
            return None;
        }
        Some(SplitSpec {
            split_id: i,
            mode: c.mode,
            train,
            test,
            train_period: None,
            test_period: None,
        })
    }
}

impl Iterator for WalkForward {
    type Item = SplitSpec;

    fn next(&mut self) -> Option<SplitSpec> {
        let split = self.split_at(self.next_id)?;
        self.next_id += 1;
        Some(split)
    }
}

/// Eager convenience wrapper around `WalkForward`.
pub fn generate_splits(
    n_indices: usize,
    config: SplitConfig,
) -> Result<Vec<SplitSpec>, InvalidSplitConfig> {
    Ok(WalkForward::new(n_indices, config)?.collect())
}
