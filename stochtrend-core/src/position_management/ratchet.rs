/// Ratchet invariant enforcement for the long trailing stop.
///
/// **Core Rule:** the trailing stop may tighten, never loosen, even if ATR
/// expands after entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailingRatchet {
    level: Option<f64>,
}

impl TrailingRatchet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_level(level: f64) -> Self {
        Self { level: Some(level) }
    }

    /// Apply the ratchet to a proposed stop level and return the kept level.
    ///
    /// # Example
    /// ```
    /// use stochtrend_core::position_management::TrailingRatchet;
    ///
    /// let mut ratchet = TrailingRatchet::with_initial_level(95.0);
    /// assert_eq!(ratchet.apply(100.0), 100.0);
    /// // Loosening is blocked
    /// assert_eq!(ratchet.apply(90.0), 100.0);
    /// ```
    pub fn apply(&mut self, proposed: f64) -> f64 {
        let next = match self.level {
            Some(current) => current.max(proposed),
            None => proposed,
        };
        self.level = Some(next);
        next
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_apply_initializes() {
        let mut r = TrailingRatchet::new();
        assert_eq!(r.level(), None);
        assert_eq!(r.apply(90.0), 90.0);
        assert_eq!(r.level(), Some(90.0));
    }

    #[test]
    fn never_loosens() {
        let mut r = TrailingRatchet::with_initial_level(95.0);
        assert_eq!(r.apply(94.0), 95.0);
        assert_eq!(r.apply(97.5), 97.5);
        assert_eq!(r.apply(96.0), 97.5);
    }

    #[test]
    fn reset_clears_level() {
        let mut r = TrailingRatchet::with_initial_level(95.0);
        r.reset();
        assert_eq!(r.apply(80.0), 80.0);
    }
}
