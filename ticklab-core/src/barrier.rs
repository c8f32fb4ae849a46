//! Tick-level first-hit barrier resolution.
//!
//! Scans one bar's tick slice in time order and reports the first barrier
//! touched, or `None` when neither threshold is reached inside the slice. The
//! caller (the labeler) carries the same thresholds into the next bar's slice
//! until a hit or timeout.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Direction, Outcome, Tick};

/// Which tick price is tested against the barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Mid price, (bid + ask) / 2. Matches mid-price tick slices from ingest.
    Mid,
    /// Per-condition quote sides: long TP touches on bid, long SL on ask,
    /// mirrored for short.
    BidAsk,
}

/// Resolution when a single tick satisfies both barriers at once (wide spread
/// or a large tick jump).
///
/// `StopLoss` is the conservative default: a collision is never resolved in
/// the trade's favor. The policy is explicit configuration so the choice is
/// testable rather than baked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    StopLoss,
    TakeProfit,
}

/// A barrier touch found inside a tick slice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierHit {
    /// `TakeProfit` or `StopLoss`; the resolver never emits `Timeout`.
    pub outcome: Outcome,
    /// The touching tick's price under the configured basis.
    pub exit_price: f64,
    pub exit_ts_ns: i64,
    /// Offset of the touching tick within the scanned slice.
    pub tick_offset: usize,
}

/// First-hit scanner over tick slices.
#[derive(Debug, Clone, Copy)]
pub struct BarrierResolver {
    pub basis: PriceBasis,
    pub tie_policy: TiePolicy,
}

impl Default for BarrierResolver {
    fn default() -> Self {
        Self {
            basis: PriceBasis::Mid,
            tie_policy: TiePolicy::StopLoss,
        }
    }
}

impl BarrierResolver {
    pub fn new(basis: PriceBasis, tie_policy: TiePolicy) -> Self {
        Self { basis, tie_policy }
    }

    /// The prices testing the TP and SL conditions for one tick.
    ///
    /// Under `BidAsk` the two conditions read different quote sides (long TP
    /// touches on bid, long SL on ask; mirrored for short), which is why a
    /// single tick with a wide or crossed quote can satisfy both barriers at
    /// once. Under `Mid` both read the mid and a collision requires
    /// degenerate distances.
    fn touch_prices(&self, tick: &Tick, direction: Direction) -> (f64, f64) {
        match self.basis {
            PriceBasis::Mid => (tick.mid(), tick.mid()),
            PriceBasis::BidAsk => match direction {
                Direction::Long => (tick.bid, tick.ask),
                Direction::Short => (tick.ask, tick.bid),
            },
        }
    }

    /// Scan `ticks` in order for the first barrier touch.
    ///
    /// Long: TP at `price >= entry + tp`, SL at `price <= entry - sl`.
    /// Short: TP at `price <= entry - tp`, SL at `price >= entry + sl`.
    /// A tick satisfying both resolves per `tie_policy`. `None` means no
    /// touch inside this slice.
    pub fn resolve(
        &self,
        entry_price: f64,
        direction: Direction,
        tp_distance: f64,
        sl_distance: f64,
        ticks: &[Tick],
    ) -> Option<BarrierHit> {
        let sign = direction.sign();
        let tp_level = entry_price + sign * tp_distance;
        let sl_level = entry_price - sign * sl_distance;

        for (offset, tick) in ticks.iter().enumerate() {
            let (tp_price, sl_price) = self.touch_prices(tick, direction);
            let tp_hit = sign * (tp_price - tp_level) >= 0.0;
            let sl_hit = sign * (sl_price - sl_level) <= 0.0;

            let (outcome, exit_price) = match (tp_hit, sl_hit) {
                (false, false) => continue,
                (true, false) => (Outcome::TakeProfit, tp_price),
                (false, true) => (Outcome::StopLoss, sl_price),
                (true, true) => match self.tie_policy {
                    TiePolicy::StopLoss => (Outcome::StopLoss, sl_price),
                    TiePolicy::TakeProfit => (Outcome::TakeProfit, tp_price),
                },
            };

            return Some(BarrierHit {
                outcome,
                exit_price,
                exit_ts_ns: tick.ts_ns,
                tick_offset: offset,
            });
        }

        None
    }

    /// Bar-level fallback when no tick slice exists: test the bar's high/low
    /// against the same thresholds.
    ///
    /// Intra-bar tick ordering is unknown here, so a bar whose range spans
    /// both barriers resolves per `tie_policy`, the exit price is the barrier
    /// level itself, and the exit time is the bar close.
    pub fn resolve_bar(
        &self,
        entry_price: f64,
        direction: Direction,
        tp_distance: f64,
        sl_distance: f64,
        bar: &Bar,
    ) -> Option<BarrierHit> {
        let sign = direction.sign();
        let tp_level = entry_price + sign * tp_distance;
        let sl_level = entry_price - sign * sl_distance;

        let tp_hit = match direction {
            Direction::Long => bar.high >= tp_level,
            Direction::Short => bar.low <= tp_level,
        };
        let sl_hit = match direction {
            Direction::Long => bar.low <= sl_level,
            Direction::Short => bar.high >= sl_level,
        };

        let (outcome, exit_price) = match (tp_hit, sl_hit) {
            (false, false) => return None,
            (true, false) => (Outcome::TakeProfit, tp_level),
            (false, true) => (Outcome::StopLoss, sl_level),
            (true, true) => match self.tie_policy {
                TiePolicy::StopLoss => (Outcome::StopLoss, sl_level),
                TiePolicy::TakeProfit => (Outcome::TakeProfit, tp_level),
            },
        };

        Some(BarrierHit {
            outcome,
            exit_price,
            exit_ts_ns: bar.t_close_ns,
            tick_offset: 0,
        })
    }
}
