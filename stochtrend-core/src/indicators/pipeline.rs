//! Per-timeframe indicator pipeline and bounded state history.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::bollinger::{Bollinger, BollingerValue};
use super::dmi::Dmi;
use super::macd::Macd;
use super::rolling::{MovingAverage, SmaState};
use super::sma::Sma;
use super::stoch_rsi::StochRsi;
use super::{require, Atr, Indicator, NotReady};
use crate::config::IndicatorConfig;
use crate::domain::Bar;

/// Every derived value for one closed bar. `None` means still warming up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorState {
    pub bar_index: usize,
    pub bar: Bar,
    pub rsi: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub atr: Option<f64>,
    pub atr_avg: Option<f64>,
    pub boll_upper: Option<f64>,
    pub boll_mid: Option<f64>,
    pub boll_lower: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub adx: Option<f64>,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub volume_ma_short: Option<f64>,
    pub volume_ma_long: Option<f64>,
}

impl IndicatorState {
    fn empty(bar_index: usize, bar: Bar) -> Self {
        Self {
            bar_index,
            bar,
            rsi: None,
            stoch_k: None,
            stoch_d: None,
            atr: None,
            atr_avg: None,
            boll_upper: None,
            boll_mid: None,
            boll_lower: None,
            plus_di: None,
            minus_di: None,
            adx: None,
            fast_ma: None,
            slow_ma: None,
            macd: None,
            macd_signal: None,
            volume_ma_short: None,
            volume_ma_long: None,
        }
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    /// %K and %D together.
    pub fn stoch(&self) -> Result<(f64, f64), NotReady> {
        Ok((
            require(self.stoch_k, "stoch_k")?,
            require(self.stoch_d, "stoch_d")?,
        ))
    }

    pub fn bollinger(&self) -> Result<BollingerValue, NotReady> {
        Ok(BollingerValue {
            upper: require(self.boll_upper, "boll_upper")?,
            mid: require(self.boll_mid, "boll_mid")?,
            lower: require(self.boll_lower, "boll_lower")?,
        })
    }

    /// Ready values keyed by name, for attaching to order intents.
    pub fn ready_values(&self) -> BTreeMap<String, f64> {
        let fields = [
            ("close", Some(self.bar.close)),
            ("volume", Some(self.bar.volume)),
            ("rsi", self.rsi),
            ("stoch_k", self.stoch_k),
            ("stoch_d", self.stoch_d),
            ("atr", self.atr),
            ("atr_avg", self.atr_avg),
            ("boll_upper", self.boll_upper),
            ("boll_mid", self.boll_mid),
            ("boll_lower", self.boll_lower),
            ("plus_di", self.plus_di),
            ("minus_di", self.minus_di),
            ("adx", self.adx),
            ("fast_ma", self.fast_ma),
            ("slow_ma", self.slow_ma),
            ("macd", self.macd),
            ("macd_signal", self.macd_signal),
            ("volume_ma_short", self.volume_ma_short),
            ("volume_ma_long", self.volume_ma_long),
        ];
        fields
            .into_iter()
            .filter_map(|(name, v)| v.map(|v| (name.to_string(), v)))
            .collect()
    }
}

/// Bounded ring of the most recent states, newest last.
#[derive(Debug, Clone)]
pub struct StateHistory {
    capacity: usize,
    states: VecDeque<IndicatorState>,
}

impl StateHistory {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "history capacity must be >= 1");
        Self {
            capacity,
            states: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, state: IndicatorState) {
        if self.states.len() == self.capacity {
            self.states.pop_front();
        }
        self.states.push_back(state);
    }

    /// The state `n` bars back; `ago(0)` is the latest.
    pub fn ago(&self, n: usize) -> Option<&IndicatorState> {
        let len = self.states.len();
        if n >= len {
            return None;
        }
        self.states.get(len - 1 - n)
    }

    pub fn latest(&self) -> Option<&IndicatorState> {
        self.states.back()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// All indicators for one timeframe, advanced together once per closed bar.
#[derive(Debug, Clone)]
pub struct IndicatorPipeline {
    stoch: StochRsi,
    atr: Atr,
    atr_avg: SmaState,
    bollinger: Bollinger,
    dmi: Dmi,
    fast_ma: MovingAverage,
    slow_ma: MovingAverage,
    macd: Macd,
    volume_short: Sma,
    volume_long: Sma,
    bars_seen: usize,
    history: StateHistory,
}

impl IndicatorPipeline {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            stoch: StochRsi::from_config(config),
            atr: Atr::new(config.atr_period),
            atr_avg: SmaState::new(config.atr_average_period),
            bollinger: Bollinger::new(config.boll_period, config.boll_dev),
            dmi: Dmi::new(config.dmi_period),
            fast_ma: MovingAverage::new(config.ma_kind, config.fast_ma_period),
            slow_ma: MovingAverage::new(config.ma_kind, config.slow_ma_period),
            macd: Macd::new(
                config.macd_fast_period,
                config.macd_slow_period,
                config.macd_signal_period,
            ),
            volume_short: Sma::volume(config.volume_short_period),
            volume_long: Sma::volume(config.volume_long_period),
            bars_seen: 0,
            history: StateHistory::new(config.history_capacity),
        }
    }

    /// Advance every indicator by one closed bar and record the new state.
    pub fn update(&mut self, bar: &Bar) -> IndicatorState {
        let mut state = IndicatorState::empty(self.bars_seen, bar.clone());
        self.bars_seen += 1;

        if let Some(v) = self.stoch.update(bar) {
            state.stoch_k = Some(v.k);
            state.stoch_d = v.d;
        }
        state.rsi = self.stoch.rsi();

        state.atr = self.atr.update(bar);
        state.atr_avg = state.atr.and_then(|atr| self.atr_avg.update(atr));

        if let Some(b) = self.bollinger.update(bar) {
            state.boll_upper = Some(b.upper);
            state.boll_mid = Some(b.mid);
            state.boll_lower = Some(b.lower);
        }

        if let Some(d) = self.dmi.update(bar) {
            state.plus_di = Some(d.plus_di);
            state.minus_di = Some(d.minus_di);
            state.adx = d.adx;
        }

        state.fast_ma = self.fast_ma.update(bar.close);
        state.slow_ma = self.slow_ma.update(bar.close);

        if let Some(m) = self.macd.update(bar) {
            state.macd = Some(m.macd);
            state.macd_signal = m.signal;
        }

        state.volume_ma_short = self.volume_short.update(bar);
        state.volume_ma_long = self.volume_long.update(bar);

        self.history.push(state.clone());
        state
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn latest(&self) -> Option<&IndicatorState> {
        self.history.latest()
    }

    /// The state one bar before the latest.
    pub fn previous(&self) -> Option<&IndicatorState> {
        self.history.ago(1)
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }
}
