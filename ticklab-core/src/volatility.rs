//! Causal EWMA volatility estimation.
//!
//! Recursive: v[t] = lambda * v[t-1] + (1 - lambda) * r[t]^2, sigma = sqrt(v).
//! Seed: sample variance of the first `warmup` returns, floored at
//! `min_variance` so a flat warmup window cannot collapse barrier widths to
//! zero.
//!
//! The state is an explicit immutable value threaded through a fold over bars
//! in index order. Feeding a bar at or before `last_bar` is a contract
//! violation and returns `SequenceError`. One sequential pass produces the
//! per-bar sigma table shared read-only by the parallel label fan-out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// EWMA configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EwmaConfig {
    /// Smoothing factor, in (0, 1). Higher = slower decay.
    pub lambda: f64,
    /// Number of leading returns used to seed the variance.
    pub warmup: usize,
    /// Floor applied to the seed variance.
    pub min_variance: f64,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            lambda: 0.94,
            warmup: 20,
            min_variance: 1e-12,
        }
    }
}

/// Volatility update applied out of bar-index order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("volatility update for bar {bar_index} arrived after bar {last_bar} was already applied")]
pub struct SequenceError {
    pub bar_index: usize,
    pub last_bar: usize,
}

/// Running EWMA variance for one symbol/frame.
///
/// Immutable: `update` returns a new state rather than mutating in place, so
/// the causal invariant (no bar at or past the one being labeled has been
/// folded in) is visible in the dataflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolatilityState {
    variance: f64,
    lambda: f64,
    last_bar: usize,
}

impl VolatilityState {
    /// Seed a state at bar 0 from the leading returns of the series.
    ///
    /// `returns[0]` is the placeholder zero return of the first bar and is
    /// skipped; the seed is the sample variance of the next `warmup` genuine
    /// returns, floored at `min_variance`.
    pub fn seed_from_returns(returns: &[f64], config: &EwmaConfig) -> Self {
        assert!(
            config.lambda > 0.0 && config.lambda < 1.0,
            "EWMA lambda must be in (0, 1)"
        );
        let window_end = returns.len().min(1 + config.warmup);
        let window: &[f64] = if returns.len() > 1 {
            &returns[1..window_end]
        } else {
            &[]
        };
        let variance = sample_variance(window).max(config.min_variance);
        Self {
            variance,
            lambda: config.lambda,
            last_bar: 0,
        }
    }

    /// Fold in the return of `bar_index`. Must be called in strictly
    /// increasing bar-index order.
    pub fn update(&self, bar_index: usize, bar_return: f64) -> Result<Self, SequenceError> {
        if bar_index <= self.last_bar {
            return Err(SequenceError {
                bar_index,
                last_bar: self.last_bar,
            });
        }
        Ok(Self {
            variance: self.lambda * self.variance + (1.0 - self.lambda) * bar_return * bar_return,
            lambda: self.lambda,
            last_bar: bar_index,
        })
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn sigma(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Index of the last bar whose return has been folded in.
    pub fn last_bar(&self) -> usize {
        self.last_bar
    }
}

/// Sample variance (mean-adjusted, n-1 denominator). Zero for fewer than two
/// observations.
fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    ss / (n - 1) as f64
}

/// One sequential pass over the return series, producing the sigma visible to
/// each bar index.
///
/// `sigma[i]` incorporates returns of bars strictly before `i` only, so an
/// event at bar `i` never sees its own bar's return. `returns` is the per-bar
/// close-to-close series with `returns[0] == 0` (see
/// `MarketData::close_returns`).
pub fn precompute_sigma(returns: &[f64], config: &EwmaConfig) -> Result<Vec<f64>, SequenceError> {
    let n = returns.len();
    let mut sigma = vec![0.0; n];
    if n == 0 {
        return Ok(sigma);
    }

    let mut state = VolatilityState::seed_from_returns(returns, config);
    sigma[0] = state.sigma();
    for i in 1..n {
        sigma[i] = state.sigma();
        state = state.update(i, returns[i])?;
    }
    Ok(sigma)
}
