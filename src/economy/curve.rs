use serde::{Deserialize, Serialize};

/// `base^exponent` for level-driven growth. Exponents past `i32::MAX` go
/// through `powf` instead of wrapping, so the result keeps growing (to
/// infinity for bases above 1).
pub fn level_pow(base: f64, exponent: u32) -> f64 {
    match i32::try_from(exponent) {
        Ok(exp) => base.powi(exp),
        Err(_) => base.powf(f64::from(exponent)),
    }
}

/// Exponential upgrade cost: `initial_cost * multiplier^level`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCostCurve {
    pub initial_cost: f64,
    pub multiplier: f64,
}

impl UpgradeCostCurve {
    pub const fn new(initial_cost: f64, multiplier: f64) -> Self {
        Self {
            initial_cost,
            multiplier,
        }
    }

    /// Cost of buying the next level when currently at `level`
    pub fn cost(&self, level: u32) -> f64 {
        self.initial_cost * level_pow(self.multiplier, level)
    }

    /// Total cost of going from `from` to `to` (exclusive of `to`'s own cost)
    pub fn cumulative_cost(&self, from: u32, to: u32) -> f64 {
        (from..to).map(|level| self.cost(level)).sum()
    }

    /// How many consecutive levels `budget` buys starting at `level`
    pub fn affordable_levels(&self, level: u32, budget: f64) -> u32 {
        let mut remaining = budget;
        let mut bought = 0;
        loop {
            let Some(next) = level.checked_add(bought) else {
                return bought;
            };
            let cost = self.cost(next);
            if !cost.is_finite() || cost > remaining {
                return bought;
            }
            remaining -= cost;
            bought += 1;
        }
    }

    /// Strictly increasing curves need a positive start and a growth factor above 1
    pub fn validate(&self) -> Result<(), String> {
        if !(self.initial_cost.is_finite() && self.initial_cost > 0.0) {
            return Err(format!("initial_cost must be > 0, got {}", self.initial_cost));
        }
        if !(self.multiplier.is_finite() && self.multiplier > 1.0) {
            return Err(format!("multiplier must be > 1, got {}", self.multiplier));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_curve_examples() {
        let curve = UpgradeCostCurve::new(10.0, 1.5);
        assert_eq!(curve.cost(0), 10.0);
        assert_eq!(curve.cost(1), 15.0);
        assert_eq!(curve.cost(2), 22.5);
    }

    #[test]
    fn test_cost_strictly_increasing() {
        let curve = UpgradeCostCurve::new(50.0, 1.8);
        for level in 0..40 {
            assert!(curve.cost(level + 1) > curve.cost(level));
        }
    }

    #[test]
    fn test_cumulative_and_affordable() {
        let curve = UpgradeCostCurve::new(10.0, 1.5);
        assert_eq!(curve.cumulative_cost(0, 2), 25.0);
        assert_eq!(curve.affordable_levels(0, 25.0), 2);
        assert_eq!(curve.affordable_levels(0, 24.9), 1);
        assert_eq!(curve.affordable_levels(0, 0.0), 0);
    }

    #[test]
    fn test_cost_beyond_i32_range_stays_unaffordable() {
        let curve = UpgradeCostCurve::new(10.0, 1.5);
        let huge = i32::MAX as u32 + 1;
        assert_eq!(curve.cost(huge), f64::INFINITY);
        assert_eq!(curve.cost(3_000_000_000), f64::INFINITY);
        assert_eq!(curve.cost(u32::MAX), f64::INFINITY);
        assert!(curve.cost(huge) >= curve.cost(i32::MAX as u32));
        assert_eq!(curve.affordable_levels(3_000_000_000, f64::MAX), 0);
    }

    #[test]
    fn test_level_pow_matches_powi_in_range() {
        assert_eq!(level_pow(1.5, 0), 1.0);
        assert_eq!(level_pow(1.5, 2), 2.25);
        assert_eq!(level_pow(3.0, 4), 81.0);
        assert_eq!(level_pow(1.0, u32::MAX), 1.0);
    }

    #[test]
    fn test_validate_rejects_flat_curve() {
        assert!(UpgradeCostCurve::new(10.0, 1.0).validate().is_err());
        assert!(UpgradeCostCurve::new(0.0, 2.0).validate().is_err());
        assert!(UpgradeCostCurve::new(10.0, 1.5).validate().is_ok());
    }
}
