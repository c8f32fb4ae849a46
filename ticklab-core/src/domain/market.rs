//! Materialized market data: the bar table plus the flat tick store.
//!
//! Upstream ingest hands over bars and tick slices fully materialized before
//! labeling begins. `MarketData::new` validates the ordering invariants once;
//! after that the labeler and resolver treat them as given and never re-sort.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, Tick};

/// Structured validation errors for market data handed over by ingest.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("bar {index} failed sanity check (inverted OHLC, NaN, or empty interval)")]
    BarNotSane { index: usize },

    #[error("bar {index} opens at {t_open_ns} ns, before the previous bar closes")]
    UnorderedBars { index: usize, t_open_ns: i64 },

    #[error("bar {index} tick range {tick_start}..{tick_end} exceeds tick store of {store_len}")]
    SliceOutOfBounds {
        index: usize,
        tick_start: usize,
        tick_end: usize,
        store_len: usize,
    },

    #[error("bar {index} tick range overlaps the previous bar's range")]
    OverlappingSlices { index: usize },

    #[error("bar {index} declares {n_ticks} ticks but its slice holds {slice_len}")]
    TickCountMismatch {
        index: usize,
        n_ticks: u32,
        slice_len: usize,
    },

    #[error("tick {seq} of bar {bar_index} is out of time order")]
    UnorderedTicks { bar_index: usize, seq: usize },

    #[error("tick {seq} of bar {bar_index} has sequence number {found}, expected {seq}")]
    BadSequenceNumber {
        bar_index: usize,
        seq: usize,
        found: u32,
    },

    #[error("tick {seq} of bar {bar_index} stamps outside the bar interval")]
    TickOutsideBar { bar_index: usize, seq: usize },
}

/// Bars plus the flat tick store they index into.
///
/// Constructed once per symbol/frame from ingest output. Read-only afterwards,
/// which is what makes the parallel label fan-out lock-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    bars: Vec<Bar>,
    ticks: Vec<Tick>,
}

impl MarketData {
    /// Validate ordering invariants and take ownership of the tables.
    ///
    /// Checks per bar: OHLC sanity, strictly increasing non-overlapping
    /// intervals, tick ranges within the store and monotone across bars.
    /// Checks per tick: sequence numbers 0-based within the bar, timestamps
    /// non-decreasing and inside the bar interval.
    pub fn new(bars: Vec<Bar>, ticks: Vec<Tick>) -> Result<Self, DataError> {
        let mut prev_close_ns = i64::MIN;
        let mut prev_tick_end = 0usize;

        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(DataError::BarNotSane { index });
            }
            if bar.t_open_ns < prev_close_ns {
                return Err(DataError::UnorderedBars {
                    index,
                    t_open_ns: bar.t_open_ns,
                });
            }
            prev_close_ns = bar.t_close_ns;

            if bar.tick_end > ticks.len() {
                return Err(DataError::SliceOutOfBounds {
                    index,
                    tick_start: bar.tick_start,
                    tick_end: bar.tick_end,
                    store_len: ticks.len(),
                });
            }
            if bar.tick_start < prev_tick_end {
                return Err(DataError::OverlappingSlices { index });
            }
            prev_tick_end = bar.tick_end;

            let slice = &ticks[bar.tick_start..bar.tick_end];
            if !slice.is_empty() && slice.len() != bar.n_ticks as usize {
                return Err(DataError::TickCountMismatch {
                    index,
                    n_ticks: bar.n_ticks,
                    slice_len: slice.len(),
                });
            }

            let mut prev_ts = i64::MIN;
            for (seq, tick) in slice.iter().enumerate() {
                if tick.seq as usize != seq {
                    return Err(DataError::BadSequenceNumber {
                        bar_index: index,
                        seq,
                        found: tick.seq,
                    });
                }
                if tick.ts_ns < prev_ts {
                    return Err(DataError::UnorderedTicks {
                        bar_index: index,
                        seq,
                    });
                }
                prev_ts = tick.ts_ns;
                if !tick.in_bar(bar) {
                    return Err(DataError::TickOutsideBar {
                        bar_index: index,
                        seq,
                    });
                }
            }
        }

        Ok(Self { bars, ticks })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn n_bars(&self) -> usize {
        self.bars.len()
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// The tick slice backing one bar. `None` when the bar carries no tick
    /// data (slice not exported by ingest, or an empty range).
    pub fn tick_slice(&self, bar_index: usize) -> Option<&[Tick]> {
        let bar = self.bars.get(bar_index)?;
        if bar.tick_start >= bar.tick_end {
            return None;
        }
        Some(&self.ticks[bar.tick_start..bar.tick_end])
    }

    /// Close-to-close returns, one per bar; return[0] is 0.
    pub fn close_returns(&self) -> Vec<f64> {
        let mut returns = vec![0.0; self.bars.len()];
        for i in 1..self.bars.len() {
            let prev = self.bars[i - 1].close;
            if prev != 0.0 {
                returns[i] = (self.bars[i].close - prev) / prev;
            }
        }
        returns
    }
}
