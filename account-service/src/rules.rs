//! Reward amounts and eligibility windows

use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};
use common::error::{Error, Result};
use common::model::user::Points;
use rand::seq::SliceRandom;
use rand::Rng;

/// Prizes on the reward wheel, drawn with equal probability
pub const SPIN_REWARDS: [Points; 4] = [1000, 3000, 5000, 10000];

/// Points granted per tap
pub const TAP_AMOUNT: Points = 1;

/// One-time bonus for subscribing
pub const SUBSCRIPTION_BONUS: Points = 3000;

/// Bonus for the daily claim
pub const DAILY_BONUS: Points = 1000;

/// Hours between two wheel spins
pub const SPIN_COOLDOWN_HOURS: i64 = 6;

/// Reward rules applied by the account service
#[derive(Debug, Clone)]
pub struct RewardRules {
    /// Points per tap
    pub tap_amount: Points,
    /// Minimum time between two spins
    pub spin_cooldown: Duration,
    /// Wheel prizes
    pub spin_rewards: Vec<Points>,
    /// Subscription bonus
    pub subscription_bonus: Points,
    /// Daily claim bonus
    pub daily_bonus: Points,
    /// Offset of the time zone whose midnight resets the daily claim
    pub daily_reset_offset: FixedOffset,
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            tap_amount: TAP_AMOUNT,
            spin_cooldown: Duration::hours(SPIN_COOLDOWN_HOURS),
            spin_rewards: SPIN_REWARDS.to_vec(),
            subscription_bonus: SUBSCRIPTION_BONUS,
            daily_bonus: DAILY_BONUS,
            daily_reset_offset: Utc.fix(),
        }
    }
}

impl RewardRules {
    /// Default rules with the daily reset at midnight of a UTC offset given in minutes
    pub fn with_daily_reset_offset_minutes(minutes: i32) -> Result<Self> {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60)).ok_or_else(|| {
            Error::Configuration(format!("Daily reset offset out of range: {} minutes", minutes))
        })?;

        Ok(Self {
            daily_reset_offset: offset,
            ..Self::default()
        })
    }

    /// Reject rules that would break the balance invariants
    pub fn validate(&self) -> Result<()> {
        if self.spin_rewards.is_empty() {
            return Err(Error::Configuration("Spin reward table is empty".to_string()));
        }
        if self.spin_rewards.iter().any(|reward| *reward <= 0) {
            return Err(Error::Configuration("Spin rewards must be positive".to_string()));
        }
        for (name, amount) in [
            ("tap amount", self.tap_amount),
            ("subscription bonus", self.subscription_bonus),
            ("daily bonus", self.daily_bonus),
        ] {
            if amount <= 0 {
                return Err(Error::Configuration(format!("The {} must be positive", name)));
            }
        }
        if self.spin_cooldown < Duration::zero() {
            return Err(Error::Configuration("Spin cooldown cannot be negative".to_string()));
        }
        Ok(())
    }

    /// Draw a wheel prize from the thread-local generator
    pub fn pick_spin_reward(&self) -> Result<Points> {
        self.pick_spin_reward_with(&mut rand::thread_rng())
    }

    /// Draw a wheel prize from the given generator
    pub fn pick_spin_reward_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Points> {
        self.spin_rewards
            .choose(rng)
            .copied()
            .ok_or_else(|| Error::Configuration("Spin reward table is empty".to_string()))
    }

    /// Start of the claim day that contains `now`, as a UTC instant
    pub fn day_start(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let local_midnight = now
            .with_timezone(&self.daily_reset_offset)
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::Internal(format!("No midnight for {}", now)))?;

        self.daily_reset_offset
            .from_local_datetime(&local_midnight)
            .single()
            .map(|start| start.with_timezone(&Utc))
            .ok_or_else(|| Error::Internal(format!("Ambiguous day start for {}", now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = RewardRules::default();
        rules.validate().unwrap();
        assert_eq!(rules.spin_rewards, vec![1000, 3000, 5000, 10000]);
        assert_eq!(rules.spin_cooldown, Duration::hours(6));
        assert_eq!(rules.subscription_bonus, 3000);
        assert_eq!(rules.daily_bonus, 1000);
        assert_eq!(rules.tap_amount, 1);
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = RewardRules { spin_rewards: vec![], ..RewardRules::default() };
        assert!(matches!(rules.validate(), Err(Error::Configuration(_))));

        let rules = RewardRules { daily_bonus: 0, ..RewardRules::default() };
        assert!(matches!(rules.validate(), Err(Error::Configuration(_))));

        let rules = RewardRules { spin_cooldown: Duration::hours(-1), ..RewardRules::default() };
        assert!(matches!(rules.validate(), Err(Error::Configuration(_))));

        assert!(RewardRules::with_daily_reset_offset_minutes(24 * 60).is_err());
    }

    #[test]
    fn test_spin_rewards_cover_whole_table() {
        let rules = RewardRules::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = HashSet::new();

        for _ in 0..1000 {
            let reward = rules.pick_spin_reward_with(&mut rng).unwrap();
            assert!(SPIN_REWARDS.contains(&reward));
            seen.insert(reward);
        }

        assert_eq!(seen.len(), SPIN_REWARDS.len());
    }

    #[test]
    fn test_day_start_utc() {
        let rules = RewardRules::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        assert_eq!(rules.day_start(now).unwrap(), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_day_start_with_offset() {
        // UTC+3: 22:30 UTC on March 1st is already March 2nd locally
        let rules = RewardRules::with_daily_reset_offset_minutes(180).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 22, 30, 0).unwrap();
        assert_eq!(rules.day_start(now).unwrap(), Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap());

        // UTC-5: 03:00 UTC on March 2nd is still March 1st locally
        let rules = RewardRules::with_daily_reset_offset_minutes(-300).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 3, 0, 0).unwrap();
        assert_eq!(rules.day_start(now).unwrap(), Utc.with_ymd_and_hms(2024, 3, 1, 5, 0, 0).unwrap());
    }
}
