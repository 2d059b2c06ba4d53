//! Strategy configuration.
//!
//! One immutable `StrategyConfig` is handed to the engine at construction and
//! never changes afterwards. Every field has a default, so a TOML file only
//! needs the values it overrides:
//!
//! ```toml
//! [indicators]
//! rsi_period = 16
//!
//! [risk]
//! stop_loss_multiplier = 3.0
//! take_profit_multiplier = 4.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Moving-average flavour used where the strategy allows a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaKind {
    Sma,
    Ema,
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub indicators: IndicatorConfig,
    pub trend: TrendConfig,
    pub signals: SignalConfig,
    pub risk: RiskConfig,
}

/// Periods for every indicator in the pipeline. Shared by both timeframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub boll_period: usize,
    pub boll_dev: f64,
    pub dmi_period: usize,
    pub rsi_period: usize,
    pub stoch_period: usize,
    pub stoch_d_period: usize,
    /// Extra smoothing of %K before %D is taken. `None` disables it.
    pub smooth_period: Option<usize>,
    /// Smoothing of RSI before the stochastic window. `None` disables it.
    pub rsi_smooth_period: Option<usize>,
    pub stoch_ma: MaKind,
    pub atr_period: usize,
    pub atr_average_period: usize,
    pub ma_kind: MaKind,
    pub fast_ma_period: usize,
    pub slow_ma_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub volume_short_period: usize,
    pub volume_long_period: usize,
    /// How many past indicator states each pipeline retains.
    pub history_capacity: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            boll_period: 20,
            boll_dev: 2.0,
            dmi_period: 14,
            rsi_period: 14,
            stoch_period: 14,
            stoch_d_period: 4,
            smooth_period: Some(7),
            rsi_smooth_period: Some(7),
            stoch_ma: MaKind::Ema,
            atr_period: 14,
            atr_average_period: 20,
            ma_kind: MaKind::Ema,
            fast_ma_period: 10,
            slow_ma_period: 60,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            volume_short_period: 5,
            volume_long_period: 20,
            history_capacity: 64,
        }
    }
}

/// Slow-timeframe trend classification thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub adx_threshold: f64,
    /// Channel width in percent of the mid band below which the market is flat.
    pub boll_channel_width_threshold: f64,
    pub boll_mid_rising_periods: usize,
    pub volume_ratio_threshold: f64,
    pub atr_volatility_multiplier: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            adx_threshold: 15.0,
            boll_channel_width_threshold: 4.0,
            boll_mid_rising_periods: 3,
            volume_ratio_threshold: 1.2,
            atr_volatility_multiplier: 1.0,
        }
    }
}

/// Fast-timeframe signal checklist thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub oversold: f64,
    pub overbought: f64,
    /// Only count the buy crossover when %K was below `oversold` on both bars.
    pub require_oversold_cross: bool,
    pub bullish_required: usize,
    pub sideways_required: usize,
    pub bearish_required: usize,
    pub sell_required: usize,
    pub buy_rsi_floor: f64,
    pub sell_rsi_ceiling: f64,
    pub entry_gate: EntryGateConfig,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            oversold: 25.0,
            overbought: 75.0,
            require_oversold_cross: false,
            bullish_required: 4,
            sideways_required: 3,
            bearish_required: 5,
            sell_required: 3,
            buy_rsi_floor: 40.0,
            sell_rsi_ceiling: 60.0,
            entry_gate: EntryGateConfig::default(),
        }
    }
}

/// Trend-dependent preconditions checked before the buy checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryGateConfig {
    pub enabled: bool,
    pub sideways_max_k: f64,
    pub bearish_max_k: f64,
    pub bearish_lower_band_tolerance: f64,
    pub bearish_volume_surge: f64,
}

impl Default for EntryGateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sideways_max_k: 40.0,
            bearish_max_k: 30.0,
            bearish_lower_band_tolerance: 1.02,
            bearish_volume_surge: 1.2,
        }
    }
}

/// Stops, targets, sizing and trade-frequency limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub stop_loss_multiplier: f64,
    pub take_profit_multiplier: f64,
    pub trailing_stop_multiplier: f64,
    pub sideways_trailing_multiplier: f64,
    pub bearish_trailing_multiplier: f64,
    pub trend_scaled_stops: bool,
    pub bullish_stop_scale: f64,
    pub bearish_stop_scale: f64,
    /// Percentage floor for the initial stop (`entry * (1 - pct)`). `None` disables it.
    pub hard_stop_pct: Option<f64>,
    pub max_loss_per_trade: f64,
    pub cash_fraction: f64,
    pub min_order_size: f64,
    pub high_volatility_ratio: f64,
    pub high_volatility_size_factor: f64,
    pub volatility_breakout_multiplier: f64,
    pub min_hold_periods: usize,
    pub max_trades_per_day: u32,
    /// Fast bars a pending order may wait for its result before it is dropped.
    pub pending_order_timeout_bars: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_loss_multiplier: 2.0,
            take_profit_multiplier: 3.0,
            trailing_stop_multiplier: 2.5,
            sideways_trailing_multiplier: 1.5,
            bearish_trailing_multiplier: 1.0,
            trend_scaled_stops: false,
            bullish_stop_scale: 1.25,
            bearish_stop_scale: 0.75,
            hard_stop_pct: None,
            max_loss_per_trade: 0.02,
            cash_fraction: 0.7,
            min_order_size: 0.0001,
            high_volatility_ratio: 1.5,
            high_volatility_size_factor: 0.7,
            volatility_breakout_multiplier: 2.5,
            min_hold_periods: 2,
            max_trades_per_day: 3,
            pending_order_timeout_bars: 1,
        }
    }
}

fn require_period(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "period must be >= 1".into(),
        });
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive number, got {value}"),
        });
    }
    Ok(())
}

fn require_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be in (0, 1], got {value}"),
        });
    }
    Ok(())
}

fn require_count(field: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("must be in 1..={max}, got {value}"),
        });
    }
    Ok(())
}

impl StrategyConfig {
    /// Parse a TOML document. Missing sections and fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StrategyConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject parameter combinations that would make an indicator or a rule meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        require_period("indicators.boll_period", ind.boll_period)?;
        require_positive("indicators.boll_dev", ind.boll_dev)?;
        require_period("indicators.dmi_period", ind.dmi_period)?;
        require_period("indicators.rsi_period", ind.rsi_period)?;
        require_period("indicators.stoch_period", ind.stoch_period)?;
        require_period("indicators.stoch_d_period", ind.stoch_d_period)?;
        if let Some(p) = ind.smooth_period {
            require_period("indicators.smooth_period", p)?;
        }
        if let Some(p) = ind.rsi_smooth_period {
            require_period("indicators.rsi_smooth_period", p)?;
        }
        require_period("indicators.atr_period", ind.atr_period)?;
        require_period("indicators.atr_average_period", ind.atr_average_period)?;
        require_period("indicators.fast_ma_period", ind.fast_ma_period)?;
        require_period("indicators.slow_ma_period", ind.slow_ma_period)?;
        require_period("indicators.macd_fast_period", ind.macd_fast_period)?;
        require_period("indicators.macd_slow_period", ind.macd_slow_period)?;
        require_period("indicators.macd_signal_period", ind.macd_signal_period)?;
        require_period("indicators.volume_short_period", ind.volume_short_period)?;
        require_period("indicators.volume_long_period", ind.volume_long_period)?;
        if ind.macd_fast_period >= ind.macd_slow_period {
            return Err(ConfigError::Invalid {
                field: "indicators.macd_fast_period",
                reason: "must be shorter than macd_slow_period".into(),
            });
        }
        if ind.history_capacity < self.trend.boll_mid_rising_periods + 5 {
            return Err(ConfigError::Invalid {
                field: "indicators.history_capacity",
                reason: format!(
                    "must hold at least boll_mid_rising_periods + 5 = {} states",
                    self.trend.boll_mid_rising_periods + 5
                ),
            });
        }

        let trend = &self.trend;
        if !(0.0..=100.0).contains(&trend.adx_threshold) {
            return Err(ConfigError::Invalid {
                field: "trend.adx_threshold",
                reason: format!("must be in [0, 100], got {}", trend.adx_threshold),
            });
        }
        require_positive(
            "trend.boll_channel_width_threshold",
            trend.boll_channel_width_threshold,
        )?;
        require_period("trend.boll_mid_rising_periods", trend.boll_mid_rising_periods)?;
        require_positive("trend.volume_ratio_threshold", trend.volume_ratio_threshold)?;
        require_positive("trend.atr_volatility_multiplier", trend.atr_volatility_multiplier)?;

        let sig = &self.signals;
        if !(sig.oversold < sig.overbought
            && (0.0..=100.0).contains(&sig.oversold)
            && (0.0..=100.0).contains(&sig.overbought))
        {
            return Err(ConfigError::Invalid {
                field: "signals.overbought",
                reason: format!(
                    "need 0 <= oversold ({}) < overbought ({}) <= 100",
                    sig.oversold, sig.overbought
                ),
            });
        }
        require_count("signals.bullish_required", sig.bullish_required, 7)?;
        require_count("signals.sideways_required", sig.sideways_required, 7)?;
        require_count("signals.bearish_required", sig.bearish_required, 7)?;
        require_count("signals.sell_required", sig.sell_required, 5)?;
        require_positive(
            "signals.entry_gate.bearish_lower_band_tolerance",
            sig.entry_gate.bearish_lower_band_tolerance,
        )?;
        require_positive(
            "signals.entry_gate.bearish_volume_surge",
            sig.entry_gate.bearish_volume_surge,
        )?;

        let risk = &self.risk;
        require_positive("risk.stop_loss_multiplier", risk.stop_loss_multiplier)?;
        require_positive("risk.take_profit_multiplier", risk.take_profit_multiplier)?;
        require_positive("risk.trailing_stop_multiplier", risk.trailing_stop_multiplier)?;
        require_positive(
            "risk.sideways_trailing_multiplier",
            risk.sideways_trailing_multiplier,
        )?;
        require_positive(
            "risk.bearish_trailing_multiplier",
            risk.bearish_trailing_multiplier,
        )?;
        require_positive("risk.bullish_stop_scale", risk.bullish_stop_scale)?;
        require_positive("risk.bearish_stop_scale", risk.bearish_stop_scale)?;
        if let Some(pct) = risk.hard_stop_pct {
            require_fraction("risk.hard_stop_pct", pct)?;
        }
        require_fraction("risk.max_loss_per_trade", risk.max_loss_per_trade)?;
        require_fraction("risk.cash_fraction", risk.cash_fraction)?;
        require_positive("risk.min_order_size", risk.min_order_size)?;
        require_positive("risk.high_volatility_ratio", risk.high_volatility_ratio)?;
        require_fraction(
            "risk.high_volatility_size_factor",
            risk.high_volatility_size_factor,
        )?;
        require_positive(
            "risk.volatility_breakout_multiplier",
            risk.volatility_breakout_multiplier,
        )?;
        if risk.max_trades_per_day == 0 {
            return Err(ConfigError::Invalid {
                field: "risk.max_trades_per_day",
                reason: "must be >= 1".into(),
            });
        }
        require_period(
            "risk.pending_order_timeout_bars",
            risk.pending_order_timeout_bars,
        )?;
        Ok(())
    }
}
