//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use stochtrend_core::config::{IndicatorConfig, MaKind, StrategyConfig};
use stochtrend_core::domain::{AccountSnapshot, Bar, OrderResult, Timeframe};
use stochtrend_core::{BarOutcome, Engine};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap()
}

/// Fast-bar timestamp: 4h bars starting at `base_time`.
pub fn fast_ts(i: usize) -> DateTime<Utc> {
    base_time() + Duration::hours(4 * i as i64)
}

/// Oscillating close series with a slight drift; deterministic.
pub fn wave_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 8.0 * (i as f64 * 0.6).sin() + 0.05 * i as f64)
        .collect()
}

pub fn bar_from_close(ts: DateTime<Utc>, open: f64, close: f64, volume: f64) -> Bar {
    Bar::new(ts, open, open.max(close) + 0.5, open.min(close) - 0.5, close, volume)
}

/// Fast bars from closes: open = previous close, varying volume.
pub fn fast_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let volume = 1000.0 + 300.0 * ((i * 7) % 5) as f64;
            bar_from_close(fast_ts(i), open, close, volume)
        })
        .collect()
}

/// Daily slow bars closing at midnight UTC.
pub fn slow_bars(closes: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            bar_from_close(start + Duration::days(i as i64), open, close, 5000.0)
        })
        .collect()
}

/// Short periods so everything warms up within a few dozen bars, the entry
/// gate off and a single checklist item (the crossover) required.
pub fn fast_config() -> StrategyConfig {
    let mut config = StrategyConfig::default();
    config.indicators = IndicatorConfig {
        boll_period: 5,
        boll_dev: 2.0,
        dmi_period: 3,
        rsi_period: 3,
        stoch_period: 3,
        stoch_d_period: 2,
        smooth_period: None,
        rsi_smooth_period: None,
        stoch_ma: MaKind::Sma,
        atr_period: 3,
        atr_average_period: 3,
        ma_kind: MaKind::Sma,
        fast_ma_period: 3,
        slow_ma_period: 6,
        macd_fast_period: 2,
        macd_slow_period: 4,
        macd_signal_period: 2,
        volume_short_period: 2,
        volume_long_period: 4,
        history_capacity: 16,
    };
    config.signals.bullish_required = 1;
    config.signals.sideways_required = 1;
    config.signals.bearish_required = 1;
    config.signals.entry_gate.enabled = false;
    config
}

/// Flat daily bars that close before the first fast bar, enough to warm the
/// slow side of `fast_config` into a sideways classification.
pub fn warmup_slow_bars() -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
    (0..20)
        .map(|i| bar_from_close(start + Duration::days(i), 100.0, 100.0, 5000.0))
        .collect()
}

/// Engine with the warmup slow bars queued; they are released by the first
/// fast bar.
pub fn warm_engine(config: StrategyConfig) -> Engine {
    let mut engine = Engine::new(config).unwrap();
    for bar in warmup_slow_bars() {
        engine.on_bar(Timeframe::Slow, bar, &account()).unwrap();
    }
    engine
}

pub fn account() -> AccountSnapshot {
    AccountSnapshot::new(10_000.0, 10_000.0)
}

/// Replay fast bars, acknowledging every intent with a fill at the bar close.
pub fn replay_with_fills(engine: &mut Engine, bars: &[Bar]) -> Vec<BarOutcome> {
    let mut outcomes = Vec::with_capacity(bars.len());
    for bar in bars {
        let close = bar.close;
        let outcome = engine
            .on_bar(Timeframe::Fast, bar.clone(), &account())
            .unwrap();
        if let Some(intent) = &outcome.intent {
            engine.on_order_result(&OrderResult::filled(intent.side, intent.size, close));
        }
        outcomes.push(outcome);
    }
    outcomes
}
