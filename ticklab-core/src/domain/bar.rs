//! Bar — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Symbol, NANOS_PER_SEC};

/// OHLC bar for a single symbol and frame, with bid/ask snapshots at open and
/// close and a back-reference into the flat tick store.
///
/// Bars arrive from the ingest pipeline in strictly increasing `t_open_ns`
/// order; this crate validates that ordering once and never re-sorts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: Symbol,
    /// Bar frame identifier, e.g. "1m" or "100tick".
    pub frame: String,
    /// Bar interval start, nanoseconds since the Unix epoch.
    pub t_open_ns: i64,
    /// Bar interval end (exclusive), nanoseconds since the Unix epoch.
    pub t_close_ns: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Bid at bar open.
    pub o_bid: f64,
    /// Ask at bar open.
    pub o_ask: f64,
    /// Bid at bar close.
    pub c_bid: f64,
    /// Ask at bar close.
    pub c_ask: f64,
    /// Number of ticks aggregated into this bar.
    pub n_ticks: u32,
    /// Start of this bar's slice in the flat tick store (inclusive).
    pub tick_start: usize,
    /// End of this bar's slice in the flat tick store (exclusive).
    pub tick_end: usize,
}

impl Bar {
    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.o_bid.is_nan()
            || self.o_ask.is_nan()
            || self.c_bid.is_nan()
            || self.c_ask.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, prices positive, interval non-empty.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.t_open_ns < self.t_close_ns
            && self.tick_start <= self.tick_end
    }

    /// Bar duration in whole seconds (floor).
    pub fn duration_secs(&self) -> i64 {
        (self.t_close_ns - self.t_open_ns) / NANOS_PER_SEC
    }

    /// Bar open time as a UTC datetime. None if the timestamp is unrepresentable.
    pub fn open_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(
            self.t_open_ns / NANOS_PER_SEC,
            (self.t_open_ns % NANOS_PER_SEC) as u32,
        )
    }

    /// Bar close time as a UTC datetime. None if the timestamp is unrepresentable.
    pub fn close_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(
            self.t_close_ns / NANOS_PER_SEC,
            (self.t_close_ns % NANOS_PER_SEC) as u32,
        )
    }
}
