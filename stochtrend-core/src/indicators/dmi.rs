//! DMI / ADX: Directional Movement Index (Wilder).
//!
//! Steps:
//! 1. +DM and -DM from consecutive bars, true range against the previous close
//! 2. Wilder-smooth +DM, -DM and TR (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI), 0 when both are 0
//! 5. ADX = Wilder-smoothed DX
//!
//! +DI/-DI are available from bar `period`; ADX from bar `2 * period - 1`.

use super::atr::true_range;
use super::rolling::WilderState;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmiValue {
    pub plus_di: f64,
    pub minus_di: f64,
    /// Still warming up for the first `period - 1` DI values.
    pub adx: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Dmi {
    period: usize,
    name: String,
    prev: Option<(f64, f64, f64)>,
    tr: WilderState,
    plus_dm: WilderState,
    minus_dm: WilderState,
    adx: WilderState,
}

impl Dmi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "DMI period must be >= 1");
        Self {
            period,
            name: format!("dmi_{period}"),
            prev: None,
            tr: WilderState::new(period),
            plus_dm: WilderState::new(period),
            minus_dm: WilderState::new(period),
            adx: WilderState::new(period),
        }
    }

    /// First bar index with an ADX value.
    pub fn adx_lookback(&self) -> usize {
        2 * self.period - 1
    }
}

/// Directional movement of `bar` against the previous high/low.
fn directional_movement(bar: &Bar, prev_high: f64, prev_low: f64) -> (f64, f64) {
    let up = bar.high - prev_high;
    let down = prev_low - bar.low;
    let plus = if up > down && up > 0.0 { up } else { 0.0 };
    let minus = if down > up && down > 0.0 { down } else { 0.0 };
    (plus, minus)
}

impl Indicator for Dmi {
    type Output = DmiValue;

    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn update(&mut self, bar: &Bar) -> Option<DmiValue> {
        let (prev_high, prev_low, prev_close) =
            self.prev.replace((bar.high, bar.low, bar.close))?;
        let (plus, minus) = directional_movement(bar, prev_high, prev_low);

        let tr = self.tr.update(true_range(bar, prev_close));
        let plus = self.plus_dm.update(plus);
        let minus = self.minus_dm.update(minus);
        let (tr, plus, minus) = match (tr, plus, minus) {
            (Some(t), Some(p), Some(m)) => (t, p, m),
            _ => return None,
        };

        let (plus_di, minus_di) = if tr == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * plus / tr, 100.0 * minus / tr)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };

        Some(DmiValue {
            plus_di,
            minus_di,
            adx: self.adx.update(dx),
        })
    }

    fn reset(&mut self) {
        self.prev = None;
        self.tr.reset();
        self.plus_dm.reset();
        self.minus_dm.reset();
        self.adx.reset();
    }
}
