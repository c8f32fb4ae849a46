//! TickLab Core — tick-precision triple-barrier labeling.
//!
//! This crate contains the labeling engine:
//! - Domain types (bars, ticks, candidate events, labels)
//! - Validated market data container (bar table + flat tick store)
//! - Causal EWMA volatility estimation
//! - Tick-level first-hit barrier resolution with a configurable tie policy
//! - Triple-barrier labeler with dual vertical barriers (bars, seconds)
//! - Rayon-parallel batch labeling with read-only shared data

pub mod barrier;
pub mod batch;
pub mod domain;
pub mod labeler;
pub mod volatility;

pub use barrier::{BarrierHit, BarrierResolver, PriceBasis, TiePolicy};
pub use batch::{label_all, summarize, LabelSummary, LabeledEvent};
pub use domain::{
    Bar, CandidateEvent, DataError, Direction, EventId, Label, MarketData, Outcome, Tick,
};
pub use labeler::{LabelError, Labeler, LabelerConfig, VolScaling};
pub use volatility::{precompute_sigma, EwmaConfig, SequenceError, VolatilityState};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the parallel fan-out shares or returns
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Tick>();
        require_sync::<Tick>();
        require_send::<MarketData>();
        require_sync::<MarketData>();
        require_send::<CandidateEvent>();
        require_sync::<CandidateEvent>();
        require_send::<Label>();
        require_sync::<Label>();
        require_send::<Outcome>();
        require_sync::<Outcome>();
        require_send::<VolatilityState>();
        require_sync::<VolatilityState>();
        require_send::<LabelerConfig>();
        require_sync::<LabelerConfig>();
        require_send::<Labeler>();
        require_sync::<Labeler>();
        require_send::<LabelError>();
        require_sync::<LabelError>();
        require_send::<LabeledEvent>();
        require_sync::<LabeledEvent>();
    }
}
