//! Trend classification as seen through the engine's slow timeframe.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::*;
use stochtrend_core::domain::{Bar, Timeframe};
use stochtrend_core::trend::TrendLabel;
use stochtrend_core::Engine;

fn daily_bars(closes: &[f64], volume: impl Fn(usize) -> f64) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            bar_from_close(start + Duration::days(i as i64), open, close, volume(i))
        })
        .collect()
}

/// Queue the slow bars, then release them all with one later fast bar.
fn trend_after(slow: &[Bar]) -> (Engine, TrendLabel) {
    let mut engine = Engine::new(fast_config()).unwrap();
    for bar in slow {
        engine
            .on_bar(Timeframe::Slow, bar.clone(), &account())
            .unwrap();
    }
    let last = slow.last().unwrap();
    let fast = bar_from_close(last.timestamp + Duration::hours(4), 100.0, 100.0, 1000.0);
    engine.on_bar(Timeframe::Fast, fast, &account()).unwrap();
    let trend = engine.trend();
    (engine, trend)
}

#[test]
fn flat_market_is_sideways() {
    let slow = daily_bars(&[100.0; 30], |_| 5000.0);
    let (engine, trend) = trend_after(&slow);
    assert_eq!(trend, TrendLabel::Sideways);
    let classification = engine.classification().expect("slow side is warm");
    assert!(classification.adx < 1e-9);
}

#[test]
fn accelerating_decline_is_bearish() {
    let closes: Vec<f64> = (0..40).map(|i| 200.0 - 0.05 * (i * i) as f64).collect();
    let slow = daily_bars(&closes, |_| 5000.0);
    let (engine, trend) = trend_after(&slow);
    assert_eq!(trend, TrendLabel::Bearish);
    let c = engine.classification().unwrap();
    assert!(c.minus_di > c.plus_di);
    assert!(c.confirmations.mid_falling);
    assert!(c.confirmations.volatility_expanded);
}

#[test]
fn accelerating_rally_on_rising_volume_is_bullish() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + 0.05 * (i * i) as f64).collect();
    let slow = daily_bars(&closes, |i| 1000.0 * 1.6_f64.powi(i as i32));
    let (engine, trend) = trend_after(&slow);
    assert_eq!(trend, TrendLabel::Bullish);
    let c = engine.classification().unwrap();
    assert!(c.confirmations.volume_surge);
    assert!(c.confirmations.mid_rising);
}

#[test]
fn same_rally_without_volume_is_not_bullish() {
    let closes: Vec<f64> = (0..40).map(|i| 100.0 + 0.05 * (i * i) as f64).collect();
    let slow = daily_bars(&closes, |_| 5000.0);
    let (_, trend) = trend_after(&slow);
    assert_eq!(trend, TrendLabel::Sideways);
}

#[test]
fn unwarmed_slow_side_is_sideways() {
    let slow = daily_bars(&[100.0, 101.0, 102.0], |_| 5000.0);
    let (engine, trend) = trend_after(&slow);
    assert_eq!(trend, TrendLabel::Sideways);
    assert!(engine.classification().is_none());
}

#[test]
fn low_adx_stays_sideways_on_every_bar() {
    // Closes alternate around 100 inside a fixed high/low range: no directional
    // movement at all, so ADX stays at zero.
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let slow: Vec<Bar> = (0..30)
        .map(|i| {
            let (open, close) = if i % 2 == 0 { (100.4, 100.0) } else { (100.0, 100.4) };
            bar_from_close(start + Duration::days(i), open, close, 5000.0)
        })
        .collect();
    let mut engine = Engine::new(fast_config()).unwrap();
    let adx_ready = 2 * engine.config().indicators.dmi_period - 1;
    for (i, bar) in slow.iter().enumerate() {
        engine
            .on_bar(Timeframe::Slow, bar.clone(), &account())
            .unwrap();
        let fast = bar_from_close(bar.timestamp + Duration::hours(4), 100.0, 100.0, 1000.0);
        let outcome = engine.on_bar(Timeframe::Fast, fast, &account()).unwrap();
        assert_eq!(outcome.trend, TrendLabel::Sideways);
        if i >= adx_ready {
            let c = engine.classification().expect("classified once ADX is ready");
            assert!(c.adx < engine.config().trend.adx_threshold, "adx = {}", c.adx);
            assert_eq!(c.label, TrendLabel::Sideways);
        }
    }
}
