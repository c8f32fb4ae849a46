//! Candidate trade entry events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a candidate event within one labeling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1.0 for long, -1.0 for short. Used to mirror barrier arithmetic.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// An entry request produced by an upstream event generator.
///
/// Consumed exactly once by the labeler, never mutated. Barrier distances are
/// expressed in pips and scaled by the volatility multiplier at labeling time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub event_id: EventId,
    /// Index of the originating bar in the bar table.
    pub bar_index: usize,
    pub direction: Direction,
    pub entry_price: f64,
    /// Take-profit distance in pips, before volatility scaling.
    pub tp_pips: f64,
    /// Stop-loss distance in pips, before volatility scaling.
    pub sl_pips: f64,
    /// Vertical barrier: maximum bars to hold.
    pub timeout_bars: usize,
    /// Vertical barrier: maximum wall-clock seconds to hold (data time).
    pub timeout_secs: i64,
}
