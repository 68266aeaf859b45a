//! Hit resolution: base damage, crit roll, super-crit roll.
//!
//! Stacking policy: the crit and super-crit rolls are independent draws, a
//! super-crit always counts as a crit, and multipliers compose
//! multiplicatively (`attack * crit_mult * super_mult`).

use rand::Rng;
use serde::{Deserialize, Serialize};

pub mod hitbox;

/// Crit parameters for a single attacker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CritProfile {
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub super_crit_chance: f64,
    pub super_crit_multiplier: f64,
}

impl CritProfile {
    /// Probability-clamped copy: chances in [0, 1], multipliers >= 1
    pub fn normalized(&self) -> Self {
        Self {
            crit_chance: clamp_chance(self.crit_chance),
            crit_multiplier: clamp_multiplier(self.crit_multiplier),
            super_crit_chance: clamp_chance(self.super_crit_chance),
            super_crit_multiplier: clamp_multiplier(self.super_crit_multiplier),
        }
    }

    /// Mean damage multiplier of a hit under this profile
    pub fn expected_multiplier(&self) -> f64 {
        let p = self.normalized();
        let p_super = p.super_crit_chance;
        let p_crit_only = p.crit_chance * (1.0 - p_super);
        let p_plain = 1.0 - p_super - p_crit_only;
        p_plain + p_crit_only * p.crit_multiplier + p_super * p.crit_multiplier * p.super_crit_multiplier
    }
}

/// Outcome of one resolved hit. `damage` is exact; round only for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    pub damage: f64,
    pub is_crit: bool,
    pub is_super_crit: bool,
}

impl HitResult {
    pub fn display_damage(&self) -> u64 {
        self.damage.round() as u64
    }
}

fn clamp_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

fn clamp_multiplier(mult: f64) -> f64 {
    if mult.is_finite() {
        mult.max(1.0)
    } else {
        1.0
    }
}

/// Resolve a single hit.
///
/// Both rolls are always drawn so the RNG stream advances the same way
/// regardless of outcome.
pub fn resolve_hit<R: Rng + ?Sized>(
    rng: &mut R,
    attack_power: f64,
    crit_chance: f64,
    crit_multiplier: f64,
    super_crit_chance: f64,
    super_crit_multiplier: f64,
) -> HitResult {
    let profile = CritProfile {
        crit_chance,
        crit_multiplier,
        super_crit_chance,
        super_crit_multiplier,
    }
    .normalized();

    let base = if attack_power.is_finite() && attack_power > 0.0 {
        attack_power
    } else {
        0.0
    };

    let crit_roll: f64 = rng.gen();
    let super_roll: f64 = rng.gen();

    let is_super_crit = super_roll < profile.super_crit_chance;
    let is_crit = is_super_crit || crit_roll < profile.crit_chance;

    let mut damage = base;
    if is_crit {
        damage *= profile.crit_multiplier;
    }
    if is_super_crit {
        damage *= profile.super_crit_multiplier;
    }
    if !damage.is_finite() {
        damage = f64::MAX;
    }

    HitResult {
        damage,
        is_crit,
        is_super_crit,
    }
}

pub fn resolve_with_profile<R: Rng + ?Sized>(rng: &mut R, attack_power: f64, profile: &CritProfile) -> HitResult {
    resolve_hit(
        rng,
        attack_power,
        profile.crit_chance,
        profile.crit_multiplier,
        profile.super_crit_chance,
        profile.super_crit_multiplier,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(7)
    }

    #[test]
    fn test_no_crit_chance_is_plain_damage() {
        let mut rng = rng();
        for _ in 0..100 {
            let hit = resolve_hit(&mut rng, 10.0, 0.0, 2.0, 0.0, 3.0);
            assert_eq!(hit.damage, 10.0);
            assert!(!hit.is_crit && !hit.is_super_crit);
        }
    }

    #[test]
    fn test_guaranteed_crit() {
        let hit = resolve_hit(&mut rng(), 10.0, 1.0, 2.0, 0.0, 3.0);
        assert!(hit.is_crit);
        assert!(!hit.is_super_crit);
        assert_eq!(hit.damage, 20.0);
    }

    #[test]
    fn test_super_crit_implies_crit_and_stacks() {
        let hit = resolve_hit(&mut rng(), 10.0, 0.0, 2.0, 1.0, 3.0);
        assert!(hit.is_super_crit);
        assert!(hit.is_crit);
        assert_eq!(hit.damage, 60.0);
    }

    #[test]
    fn test_invalid_attack_power_is_zero_damage() {
        let mut rng = rng();
        assert_eq!(resolve_hit(&mut rng, -5.0, 1.0, 2.0, 1.0, 3.0).damage, 0.0);
        assert_eq!(resolve_hit(&mut rng, f64::NAN, 1.0, 2.0, 1.0, 3.0).damage, 0.0);
        assert_eq!(resolve_hit(&mut rng, f64::INFINITY, 0.0, 2.0, 0.0, 3.0).damage, 0.0);
    }

    #[test]
    fn test_multipliers_below_one_are_clamped() {
        let hit = resolve_hit(&mut rng(), 10.0, 1.0, 0.5, 1.0, 0.1);
        assert_eq!(hit.damage, 10.0);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = rng();
        let mut b = rng();
        for _ in 0..50 {
            assert_eq!(
                resolve_hit(&mut a, 10.0, 0.3, 2.0, 0.1, 3.0),
                resolve_hit(&mut b, 10.0, 0.3, 2.0, 0.1, 3.0)
            );
        }
    }

    #[test]
    fn test_expected_multiplier() {
        let profile = CritProfile {
            crit_chance: 0.0,
            crit_multiplier: 2.0,
            super_crit_chance: 0.0,
            super_crit_multiplier: 3.0,
        };
        assert!((profile.expected_multiplier() - 1.0).abs() < 1e-12);

        let always_super = CritProfile {
            super_crit_chance: 1.0,
            ..profile
        };
        assert!((always_super.expected_multiplier() - 6.0).abs() < 1e-12);

        let half_crit = CritProfile {
            crit_chance: 0.5,
            ..profile
        };
        assert!((half_crit.expected_multiplier() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_display_damage_rounds() {
        let hit = HitResult {
            damage: 14.6,
            is_crit: false,
            is_super_crit: false,
        };
        assert_eq!(hit.display_damage(), 15);
    }
}
