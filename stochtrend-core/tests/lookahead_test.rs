//! Look-ahead contamination guard.
//!
//! For every indicator: computing over bars[0..n] must give exactly the same
//! values for those bars as computing over the full series. Values must also
//! be `None` before the declared lookback and `Some` from it on.

mod common;

use common::*;
use stochtrend_core::config::{IndicatorConfig, MaKind};
use stochtrend_core::domain::Bar;
use stochtrend_core::indicators::{
    Atr, Bollinger, Dmi, Indicator, IndicatorPipeline, Macd, Rsi, Sma, StochRsi,
};

// ── Helpers ──

fn series() -> Vec<Bar> {
    fast_bars(&wave_closes(120))
}

fn assert_no_lookahead<I>(indicator: I)
where
    I: Indicator + Clone,
    I::Output: PartialEq + std::fmt::Debug,
{
    let bars = series();
    let full = indicator.compute(&bars);
    for cut in [1, indicator.lookback(), indicator.lookback() + 1, 50, 99] {
        let cut = cut.clamp(1, bars.len());
        let truncated = indicator.compute(&bars[..cut]);
        assert_eq!(
            truncated[..],
            full[..cut],
            "{} changed history when truncated at {cut}",
            indicator.name()
        );
    }
}

fn assert_lookback<I>(indicator: I)
where
    I: Indicator + Clone,
{
    let values = indicator.compute(&series());
    let lookback = indicator.lookback();
    assert!(
        values[..lookback].iter().all(Option::is_none),
        "{} produced a value before index {lookback}",
        indicator.name()
    );
    assert!(
        values[lookback..].iter().all(Option::is_some),
        "{} missing a value after index {lookback}",
        indicator.name()
    );
}

fn check<I>(indicator: I)
where
    I: Indicator + Clone,
    I::Output: PartialEq + std::fmt::Debug,
{
    assert_lookback(indicator.clone());
    assert_no_lookahead(indicator);
}

// ── Per indicator ──

#[test]
fn sma_close() {
    check(Sma::new(5));
}

#[test]
fn sma_volume() {
    check(Sma::volume(20));
}

#[test]
fn rsi() {
    check(Rsi::new(14));
}

#[test]
fn atr() {
    check(Atr::new(14));
}

#[test]
fn bollinger() {
    check(Bollinger::new(20, 2.0));
}

#[test]
fn dmi() {
    check(Dmi::new(14));
}

#[test]
fn dmi_adx_warmup() {
    let dmi = Dmi::new(5);
    let values = dmi.compute(&series());
    let adx_from = dmi.adx_lookback();
    assert!(values[dmi.lookback()..adx_from]
        .iter()
        .all(|v| v.is_some_and(|v| v.adx.is_none())));
    assert!(values[adx_from..].iter().all(|v| v.is_some_and(|v| v.adx.is_some())));
}

#[test]
fn macd() {
    check(Macd::new(12, 26, 9));
}

#[test]
fn stoch_rsi_smoothed() {
    check(StochRsi::new(14, 14, 4, Some(7), Some(7), MaKind::Ema));
}

#[test]
fn stoch_rsi_unsmoothed() {
    check(StochRsi::new(3, 3, 2, None, None, MaKind::Sma));
}

#[test]
fn pipeline_states_do_not_change_when_truncated() {
    let bars = series();
    let config = IndicatorConfig::default();

    let mut full = IndicatorPipeline::new(&config);
    let full_states: Vec<_> = bars.iter().map(|b| full.update(b).ready_values()).collect();

    for cut in [10, 60, 100] {
        let mut truncated = IndicatorPipeline::new(&config);
        for (i, bar) in bars[..cut].iter().enumerate() {
            assert_eq!(truncated.update(bar).ready_values(), full_states[i]);
        }
    }
}

#[test]
fn pipeline_fills_every_field_once_warm() {
    let mut pipeline = IndicatorPipeline::new(&fast_config().indicators);
    let mut last = None;
    for bar in series() {
        last = Some(pipeline.update(&bar));
    }
    let state = last.unwrap();
    assert_eq!(state.ready_values().len(), 19);
    assert_eq!(pipeline.bars_seen(), 120);
}
