//! Batch labeling: one sequential volatility pass, then a parallel fan-out
//! over events.
//!
//! Each event's resolution depends only on bars/ticks at or after its origin
//! and on the sigma table computed up to its origin, so the fan-out shares
//! everything read-only and needs no locks. Results are re-ordered by event
//! origin index before being returned; parallel completion order carries no
//! meaning.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{CandidateEvent, Label, MarketData, Outcome};
use crate::labeler::{LabelError, Labeler, LabelerConfig};
use crate::volatility::{precompute_sigma, SequenceError};

/// One event paired with its labeling result. A per-event failure does not
/// abort the batch; the caller decides skip-vs-abort.
#[derive(Debug)]
pub struct LabeledEvent {
    pub event: CandidateEvent,
    pub result: Result<Label, LabelError>,
}

/// Label a batch of candidate events.
///
/// Ordering of the output: by origin bar index, then event id.
pub fn label_all(
    events: &[CandidateEvent],
    data: &MarketData,
    config: &LabelerConfig,
) -> Result<Vec<LabeledEvent>, SequenceError> {
    let returns = data.close_returns();
    let sigma = precompute_sigma(&returns, &config.ewma)?;
    let labeler = Labeler::new(*config);

    let mut labeled: Vec<LabeledEvent> = events
        .par_iter()
        .map(|event| {
            // Out-of-range origins surface as OriginOutOfRange in label().
            let s = sigma.get(event.bar_index).copied().unwrap_or(0.0);
            LabeledEvent {
                event: event.clone(),
                result: labeler.label(event, data, s),
            }
        })
        .collect();

    labeled.sort_by_key(|le| (le.event.bar_index, le.event.event_id));
    Ok(labeled)
}

/// Outcome statistics over a labeled batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSummary {
    pub total_events: usize,
    pub take_profit: usize,
    pub stop_loss: usize,
    pub timeout: usize,
    pub failed: usize,
    /// take_profit / (labeled events), 0 when nothing labeled.
    pub win_rate: f64,
    pub mean_seconds_held: f64,
}

pub fn summarize(labeled: &[LabeledEvent]) -> LabelSummary {
    let mut take_profit = 0;
    let mut stop_loss = 0;
    let mut timeout = 0;
    let mut failed = 0;
    let mut seconds_sum = 0.0;

    for le in labeled {
        match &le.result {
            Ok(label) => {
                match label.outcome {
                    Outcome::TakeProfit => take_profit += 1,
                    Outcome::StopLoss => stop_loss += 1,
                    Outcome::Timeout => timeout += 1,
                }
                seconds_sum += label.seconds_held;
            }
            Err(_) => failed += 1,
        }
    }

    let n_labeled = take_profit + stop_loss + timeout;
    LabelSummary {
        total_events: labeled.len(),
        take_profit,
        stop_loss,
        timeout,
        failed,
        win_rate: if n_labeled > 0 {
            take_profit as f64 / n_labeled as f64
        } else {
            0.0
        },
        mean_seconds_held: if n_labeled > 0 {
            seconds_sum / n_labeled as f64
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, Direction, EventId, Tick, NANOS_PER_SEC};
    use crate::labeler::VolScaling;

    const BAR_NS: i64 = 60 * NANOS_PER_SEC;
    const T0: i64 = 1_700_000_000_000_000_000;

    fn make_market(n_bars: usize) -> MarketData {
        // Each bar carries two ticks: a small dip, then a push 12 pips above
        // the bar's base price, so long entries at the base hit TP quickly.
        let mut bars = Vec::new();
        let mut ticks = Vec::new();
        for i in 0..n_bars {
            let t_open = T0 + i as i64 * BAR_NS;
            let base = 1.1000;
            let tick_start = ticks.len();
            for (j, mid) in [base - 0.0002, base + 0.0012].iter().enumerate() {
                ticks.push(Tick {
                    seq: j as u32,
                    ts_ns: t_open + (j as i64 + 1) * NANOS_PER_SEC,
                    bid: mid - 0.0001,
                    ask: mid + 0.0001,
                });
            }
            bars.push(Bar {
                symbol: "EURUSD".into(),
                frame: "1m".into(),
                t_open_ns: t_open,
                t_close_ns: t_open + BAR_NS,
                open: base,
                high: base + 0.0012,
                low: base - 0.0002,
                close: base + 0.0012,
                o_bid: base - 0.0001,
                o_ask: base + 0.0001,
                c_bid: base + 0.0011,
                c_ask: base + 0.0013,
                n_ticks: 2,
                tick_start,
                tick_end: ticks.len(),
            });
        }
        MarketData::new(bars, ticks).unwrap()
    }

    fn flat_config() -> LabelerConfig {
        LabelerConfig {
            scaling: VolScaling {
                reference_sigma: 1e-4,
                floor_mult: 1.0,
                ceiling_mult: 1.0,
            },
            ..LabelerConfig::default()
        }
    }

    fn event(id: u64, bar_index: usize) -> CandidateEvent {
        CandidateEvent {
            event_id: EventId(id),
            bar_index,
            direction: Direction::Long,
            entry_price: 1.1000,
            tp_pips: 10.0,
            sl_pips: 5.0,
            timeout_bars: 10,
            timeout_secs: 3600,
        }
    }

    #[test]
    fn batch_orders_by_origin_index() {
        let data = make_market(30);
        // Submit out of order.
        let events = vec![event(0, 20), event(1, 5), event(2, 12)];
        let labeled = label_all(&events, &data, &flat_config()).unwrap();
        let origins: Vec<usize> = labeled.iter().map(|le| le.event.bar_index).collect();
        assert_eq!(origins, vec![5, 12, 20]);
    }

    #[test]
    fn batch_matches_sequential_labeling() {
        let data = make_market(30);
        let events: Vec<CandidateEvent> = (0..20).map(|i| event(i, i as usize)).collect();
        let config = flat_config();

        let batch = label_all(&events, &data, &config).unwrap();

        let returns = data.close_returns();
        let sigma = precompute_sigma(&returns, &config.ewma).unwrap();
        let labeler = Labeler::new(config);
        for le in &batch {
            let sequential = labeler
                .label(&le.event, &data, sigma[le.event.bar_index])
                .unwrap();
            let parallel = le.result.as_ref().unwrap();
            assert_eq!(parallel.outcome, sequential.outcome);
            assert_eq!(parallel.exit_ts_ns, sequential.exit_ts_ns);
            assert_eq!(parallel.exit_price, sequential.exit_price);
        }
    }

    #[test]
    fn batch_is_deterministic() {
        let data = make_market(30);
        let events: Vec<CandidateEvent> = (0..25).map(|i| event(i, (i % 28) as usize)).collect();
        let config = flat_config();

        let first = label_all(&events, &data, &config).unwrap();
        let second = label_all(&events, &data, &config).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            let (a, b) = (a.result.as_ref().unwrap(), b.result.as_ref().unwrap());
            assert_eq!(
                serde_json::to_string(a).unwrap(),
                serde_json::to_string(b).unwrap()
            );
        }
    }

    #[test]
    fn per_event_failure_does_not_abort_batch() {
        let data = make_market(10);
        let mut bad = event(1, 2);
        bad.tp_pips = -1.0;
        let events = vec![event(0, 1), bad, event(2, 3)];

        let labeled = label_all(&events, &data, &flat_config()).unwrap();
        assert_eq!(labeled.len(), 3);
        assert!(labeled[0].result.is_ok());
        assert!(matches!(
            labeled[1].result,
            Err(LabelError::InvalidBarrierConfig { .. })
        ));
        assert!(labeled[2].result.is_ok());
    }

    #[test]
    fn summary_counts_outcomes() {
        let data = make_market(12);
        let mut events: Vec<CandidateEvent> = (0..8).map(|i| event(i, i as usize)).collect();
        let mut bad = event(8, 2);
        bad.sl_pips = 0.0;
        events.push(bad);

        let labeled = label_all(&events, &data, &flat_config()).unwrap();
        let summary = summarize(&labeled);
        assert_eq!(summary.total_events, 9);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.take_profit + summary.stop_loss + summary.timeout,
            8
        );
        // Every good event hits TP in this market.
        assert_eq!(summary.take_profit, 8);
        assert!((summary.win_rate - 1.0).abs() < 1e-12);
    }
}
