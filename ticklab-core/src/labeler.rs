//! Triple-barrier labeling of candidate events.
//!
//! For each event: scale the pip distances by the causal volatility
//! multiplier, then walk bars forward from the origin, resolving each bar's
//! tick slice, until the first barrier touch or one of the two vertical
//! barriers (bar count, data-time seconds) fires. Deterministic by
//! construction: no randomness and no wall clock, only timestamps embedded in
//! the data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::barrier::{BarrierHit, BarrierResolver, PriceBasis, TiePolicy};
use crate::domain::{CandidateEvent, Direction, Label, MarketData, Outcome, Tick, NANOS_PER_SEC};
use crate::volatility::{EwmaConfig, SequenceError};

/// Labeling failures. Fatal to the single event being processed; the batch
/// layer surfaces them per event so the caller decides skip-vs-abort.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("bar {bar_index} has no tick slice but tick-level resolution was requested")]
    MissingTickSlice { bar_index: usize },

    #[error("barrier distances must be positive and finite (tp={tp}, sl={sl})")]
    InvalidBarrierConfig { tp: f64, sl: f64 },

    #[error("vertical barriers must be positive (timeout_bars={timeout_bars}, timeout_secs={timeout_secs})")]
    InvalidTimeoutConfig {
        timeout_bars: usize,
        timeout_secs: i64,
    },

    #[error("event origin bar {bar_index} is outside the bar table of {n_bars} bars")]
    OriginOutOfRange { bar_index: usize, n_bars: usize },

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Volatility scaling of barrier distances.
///
/// The multiplier is `clamp(sigma / reference_sigma, floor_mult,
/// ceiling_mult)` — monotonically increasing in sigma, clamped so a quiet or
/// violent regime cannot produce degenerate barrier widths.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolScaling {
    /// Sigma at which the multiplier is 1.0.
    pub reference_sigma: f64,
    pub floor_mult: f64,
    pub ceiling_mult: f64,
}

impl Default for VolScaling {
    fn default() -> Self {
        Self {
            reference_sigma: 1e-4,
            floor_mult: 0.5,
            ceiling_mult: 3.0,
        }
    }
}

impl VolScaling {
    pub fn multiplier(&self, sigma: f64) -> f64 {
        (sigma / self.reference_sigma).clamp(self.floor_mult, self.ceiling_mult)
    }
}

/// Labeler configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LabelerConfig {
    /// Pip size of the instrument, e.g. 0.0001 for EURUSD.
    pub pip_size: f64,
    pub scaling: VolScaling,
    pub price_basis: PriceBasis,
    pub tie_policy: TiePolicy,
    /// When a bar has no tick slice, fall back to its high/low instead of
    /// failing. Off by default: silent precision loss must be opted into.
    pub bar_fallback: bool,
    pub ewma: EwmaConfig,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            pip_size: 0.0001,
            scaling: VolScaling::default(),
            price_basis: PriceBasis::Mid,
            tie_policy: TiePolicy::StopLoss,
            bar_fallback: false,
            ewma: EwmaConfig::default(),
        }
    }
}

/// Labels one candidate event at a time against read-only market data.
#[derive(Debug, Clone, Copy)]
pub struct Labeler {
    config: LabelerConfig,
    resolver: BarrierResolver,
}

impl Labeler {
    pub fn new(config: LabelerConfig) -> Self {
        let resolver = BarrierResolver::new(config.price_basis, config.tie_policy);
        Self { config, resolver }
    }

    pub fn config(&self) -> &LabelerConfig {
        &self.config
    }

    /// The price a timeout exit would realize on one tick.
    fn mark_price(&self, tick: &Tick, direction: Direction) -> f64 {
        match self.config.price_basis {
            PriceBasis::Mid => tick.mid(),
            PriceBasis::BidAsk => match direction {
                Direction::Long => tick.bid,
                Direction::Short => tick.ask,
            },
        }
    }

    /// Label one event. `sigma` is the causal volatility estimate at the
    /// event's origin bar (see `volatility::precompute_sigma`).
    pub fn label(
        &self,
        event: &CandidateEvent,
        data: &MarketData,
        sigma: f64,
    ) -> Result<Label, LabelError> {
        let n_bars = data.n_bars();
        let origin = data
            .bar(event.bar_index)
            .ok_or(LabelError::OriginOutOfRange {
                bar_index: event.bar_index,
                n_bars,
            })?;

        let mult = self.config.scaling.multiplier(sigma);
        let tp = event.tp_pips * self.config.pip_size * mult;
        let sl = event.sl_pips * self.config.pip_size * mult;
        if !(tp > 0.0) || !(sl > 0.0) || !tp.is_finite() || !sl.is_finite() {
            return Err(LabelError::InvalidBarrierConfig { tp, sl });
        }
        // A zero or negative vertical barrier would place the deadline at or
        // before the entry and break the exit-ordering invariant.
        if event.timeout_bars == 0 || event.timeout_secs <= 0 {
            return Err(LabelError::InvalidTimeoutConfig {
                timeout_bars: event.timeout_bars,
                timeout_secs: event.timeout_secs,
            });
        }

        // Entry is at the origin bar's close; its own ticks are in the past.
        let origin_ts = origin.t_close_ns;
        let deadline_ns = origin_ts.saturating_add(event.timeout_secs.saturating_mul(NANOS_PER_SEC));

        let mut last_price = event.entry_price;
        let mut last_ts = origin_ts;

        for b in (event.bar_index + 1)..n_bars {
            match data.tick_slice(b) {
                Some(ticks) => {
                    // Ticks past the deadline belong to the timed-out world.
                    let alive = ticks.partition_point(|t| t.ts_ns <= deadline_ns);
                    let (prefix, expired) = ticks.split_at(alive);

                    if let Some(hit) = self.resolver.resolve(
                        event.entry_price,
                        event.direction,
                        tp,
                        sl,
                        prefix,
                    ) {
                        return Ok(self.emit_hit(event, origin_ts, b, tp, sl, &hit));
                    }

                    if let Some(last) = prefix.last() {
                        last_price = self.mark_price(last, event.direction);
                        last_ts = last.ts_ns;
                    }

                    if !expired.is_empty() {
                        // Wall-clock timeout. If the deadline precedes this
                        // bar entirely, only earlier bars count as held.
                        let bar_open = data.bars()[b].t_open_ns;
                        let held_end = if deadline_ns < bar_open { b - 1 } else { b };
                        return Ok(self.emit_timeout(
                            event,
                            origin_ts,
                            held_end,
                            tp,
                            sl,
                            last_price,
                            deadline_ns,
                        ));
                    }
                }
                None if self.config.bar_fallback => {
                    let bar = &data.bars()[b];
                    if bar.t_open_ns > deadline_ns {
                        return Ok(self.emit_timeout(
                            event,
                            origin_ts,
                            b - 1,
                            tp,
                            sl,
                            last_price,
                            deadline_ns,
                        ));
                    }
                    if let Some(hit) = self.resolver.resolve_bar(
                        event.entry_price,
                        event.direction,
                        tp,
                        sl,
                        bar,
                    ) {
                        return Ok(self.emit_hit(event, origin_ts, b, tp, sl, &hit));
                    }
                    last_price = match self.config.price_basis {
                        PriceBasis::Mid => (bar.c_bid + bar.c_ask) / 2.0,
                        PriceBasis::BidAsk => match event.direction {
                            Direction::Long => bar.c_bid,
                            Direction::Short => bar.c_ask,
                        },
                    };
                    last_ts = bar.t_close_ns;
                    if bar.t_close_ns > deadline_ns {
                        return Ok(self.emit_timeout(
                            event,
                            origin_ts,
                            b,
                            tp,
                            sl,
                            last_price,
                            deadline_ns,
                        ));
                    }
                }
                None => return Err(LabelError::MissingTickSlice { bar_index: b }),
            }

            if b - event.bar_index >= event.timeout_bars {
                // Bar-count timeout at the end of this bar.
                return Ok(Label {
                    event_id: event.event_id,
                    outcome: Outcome::Timeout,
                    exit_price: last_price,
                    exit_ts_ns: last_ts,
                    bars_held: b - event.bar_index,
                    seconds_held: ns_to_secs(last_ts - origin_ts),
                    tp_used: tp,
                    sl_used: sl,
                });
            }
        }

        // Data exhausted before any barrier: vertical barrier clamps to the
        // end of the series.
        Ok(Label {
            event_id: event.event_id,
            outcome: Outcome::Timeout,
            exit_price: last_price,
            exit_ts_ns: last_ts,
            bars_held: n_bars - 1 - event.bar_index,
            seconds_held: ns_to_secs(last_ts - origin_ts),
            tp_used: tp,
            sl_used: sl,
        })
    }

    fn emit_hit(
        &self,
        event: &CandidateEvent,
        origin_ts: i64,
        bar_index: usize,
        tp: f64,
        sl: f64,
        hit: &BarrierHit,
    ) -> Label {
        Label {
            event_id: event.event_id,
            outcome: hit.outcome,
            exit_price: hit.exit_price,
            exit_ts_ns: hit.exit_ts_ns,
            bars_held: bar_index - event.bar_index,
            seconds_held: ns_to_secs(hit.exit_ts_ns - origin_ts),
            tp_used: tp,
            sl_used: sl,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_timeout(
        &self,
        event: &CandidateEvent,
        origin_ts: i64,
        bar_index: usize,
        tp: f64,
        sl: f64,
        last_price: f64,
        deadline_ns: i64,
    ) -> Label {
        Label {
            event_id: event.event_id,
            outcome: Outcome::Timeout,
            exit_price: last_price,
            exit_ts_ns: deadline_ns,
            bars_held: bar_index - event.bar_index,
            seconds_held: ns_to_secs(deadline_ns - origin_ts),
            tp_used: tp,
            sl_used: sl,
        }
    }
}

fn ns_to_secs(ns: i64) -> f64 {
    ns as f64 / NANOS_PER_SEC as f64
}
