//! Tick — a single bid/ask quote.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

/// One quote from the tick store.
///
/// Ticks belonging to one bar are contiguous and time-ordered; `seq` restarts
/// at 0 for each bar. A tick's timestamp must fall within
/// `[bar.t_open_ns, bar.t_close_ns)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tick {
    /// 0-based sequence number within the owning bar.
    pub seq: u32,
    /// Quote timestamp, nanoseconds since the Unix epoch.
    pub ts_ns: i64,
    pub bid: f64,
    pub ask: f64,
}

impl Tick {
    /// Mid price, (bid + ask) / 2.
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Quoted spread.
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Whether this tick's timestamp lies inside the bar's interval.
    pub fn in_bar(&self, bar: &Bar) -> bool {
        self.ts_ns >= bar.t_open_ns && self.ts_ns < bar.t_close_ns
    }
}
