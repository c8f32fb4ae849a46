//! Label records — the labeler's output.

use serde::{Deserialize, Serialize};

use crate::domain::EventId;

/// Which barrier resolved first.
///
/// Closed variant set so downstream match arms are exhaustiveness-checked;
/// serialized as `take_profit` / `stop_loss` / `timeout` in the label table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    TakeProfit,
    StopLoss,
    Timeout,
}

/// One labeled event. Produced exactly once per candidate, immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub event_id: EventId,
    pub outcome: Outcome,
    pub exit_price: f64,
    /// Exit timestamp, nanoseconds since the Unix epoch. Always >= the
    /// event's origin timestamp.
    pub exit_ts_ns: i64,
    /// Bars elapsed between origin and exit.
    pub bars_held: usize,
    /// Data-time seconds between origin and exit.
    pub seconds_held: f64,
    /// Volatility-scaled take-profit distance actually applied.
    pub tp_used: f64,
    /// Volatility-scaled stop-loss distance actually applied.
    pub sl_used: f64,
}
