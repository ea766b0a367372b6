//! Account service implementation

use std::sync::Arc;

use chrono::Duration;
use common::clock::{Clock, SystemClock};
use common::db::run_migrations;
use common::error::{Error, ErrorExt, Result};
use common::model::user::{Points, ProfileUpdate, UserAccount};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{AccountServiceConfig, StoreKind};
use crate::repository::{ClaimOutcome, InMemoryUserRepository, PostgresUserRepository, UserRepository};
use crate::rules::RewardRules;

/// Account service applying the reward rules to user accounts
pub struct AccountService {
    /// Repository for account data
    repo: Arc<dyn UserRepository>,
    /// Source of "now" for cooldowns and daily resets
    clock: Arc<dyn Clock>,
    /// Reward amounts and windows
    rules: RewardRules,
}

/// Outcome of a successful wheel spin
#[derive(Debug, Clone, Serialize)]
pub struct SpinResult {
    /// Points won
    pub reward: Points,
    /// Account after the reward was credited
    pub user: UserAccount,
}

impl AccountService {
    /// Create a new account service backed by memory
    pub fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryUserRepository::new()),
            clock: Arc::new(SystemClock),
            rules: RewardRules::default(),
        }
    }

    /// Create an account service from explicit parts
    pub fn from_parts(
        repo: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        rules: RewardRules,
    ) -> Result<Self> {
        rules.validate()?;
        Ok(Self { repo, clock, rules })
    }

    /// Create a new account service with a configuration
    pub async fn with_config(config: &AccountServiceConfig) -> Result<Self> {
        let rules = RewardRules::with_daily_reset_offset_minutes(config.daily_reset_offset_minutes)?;

        let repo: Arc<dyn UserRepository> = match config.store {
            StoreKind::InMemory => {
                warn!("Using in-memory store, accounts will not survive a restart");
                Arc::new(InMemoryUserRepository::new())
            }
            StoreKind::Postgres => {
                let repo = PostgresUserRepository::with_config(config).await?;
                if config.run_migrations {
                    run_migrations(repo.pool(), &config.migrations_dir)
                        .await
                        .with_context(|| "Failed to apply migrations")?;
                }
                Arc::new(repo)
            }
        };

        Self::from_parts(repo, Arc::new(SystemClock), rules)
    }

    /// Create the account if absent, otherwise refresh the supplied profile fields
    pub async fn init_user(&self, identity: &str, profile: ProfileUpdate) -> Result<UserAccount> {
        let identity = required("identity", identity)?;
        info!("Initializing user {}", identity);

        // Nothing to merge into an existing account
        if profile.is_empty() {
            let existing = self.repo
                .find_by_identity(identity)
                .await
                .with_context(|| format!("Failed to initialize user {}", identity))?;
            if let Some(user) = existing {
                return Ok(user);
            }
        }

        self.repo
            .upsert_profile(identity, &profile)
            .await
            .with_context(|| format!("Failed to initialize user {}", identity))
    }

    /// Get an account by identity
    pub async fn get_user(&self, identity: &str) -> Result<UserAccount> {
        let identity = required("identity", identity)?;
        debug!("Loading user {}", identity);

        self.repo
            .find_by_identity(identity)
            .await
            .with_context(|| format!("Failed to retrieve user {}", identity))?
            .ok_or_else(|| Error::NotFound(identity.to_string()))
    }

    /// Add the tap amount to the balance
    pub async fn tap(&self, identity: &str) -> Result<UserAccount> {
        let identity = required("identity", identity)?;
        debug!("Tap from {}", identity);

        self.repo
            .increment_balance(identity, self.rules.tap_amount)
            .await
            .with_context(|| format!("Failed to record tap for {}", identity))?
            .ok_or_else(|| Error::NotFound(identity.to_string()))
    }

    /// Spin the reward wheel if the cooldown has passed
    pub async fn spin(&self, identity: &str) -> Result<SpinResult> {
        let identity = required("identity", identity)?;
        let now = self.clock.now();
        let cooldown = self.rules.spin_cooldown;
        let reward = self.rules.pick_spin_reward()?;

        let outcome = self.repo
            .claim_spin(identity, reward, now, cooldown)
            .await
            .with_context(|| format!("Failed to spin for {}", identity))?;

        match outcome {
            ClaimOutcome::Applied(user) => {
                info!("User {} won {} on the wheel", identity, reward);
                Ok(SpinResult { reward, user })
            }
            ClaimOutcome::Rejected(user) => {
                let remaining = user
                    .next_spin_at(cooldown)
                    .map(|unlock_at| unlock_at - now)
                    .unwrap_or_else(Duration::zero)
                    .max(Duration::zero());
                debug!("Spin for {} rejected, {}s remaining", identity, remaining.num_seconds());
                Err(Error::CooldownActive { remaining })
            }
            ClaimOutcome::Missing => Err(Error::NotFound(identity.to_string())),
        }
    }

    /// Grant the one-time subscription bonus
    pub async fn subscribe(&self, identity: &str) -> Result<UserAccount> {
        let identity = required("identity", identity)?;

        let outcome = self.repo
            .claim_subscription(identity, self.rules.subscription_bonus)
            .await
            .with_context(|| format!("Failed to claim subscription bonus for {}", identity))?;

        match outcome {
            ClaimOutcome::Applied(user) => {
                info!("User {} claimed the subscription bonus", identity);
                Ok(user)
            }
            ClaimOutcome::Rejected(_) => Err(Error::AlreadyClaimed("subscription bonus".to_string())),
            ClaimOutcome::Missing => Err(Error::NotFound(identity.to_string())),
        }
    }

    /// Grant the daily bonus once per calendar day
    pub async fn claim_daily(&self, identity: &str) -> Result<UserAccount> {
        let identity = required("identity", identity)?;
        let now = self.clock.now();
        let day_start = self.rules.day_start(now)?;

        let outcome = self.repo
            .claim_daily(identity, self.rules.daily_bonus, now, day_start)
            .await
            .with_context(|| format!("Failed to claim daily bonus for {}", identity))?;

        match outcome {
            ClaimOutcome::Applied(user) => {
                info!("User {} claimed the daily bonus", identity);
                Ok(user)
            }
            ClaimOutcome::Rejected(_) => Err(Error::AlreadyClaimed("daily bonus already claimed today".to_string())),
            ClaimOutcome::Missing => Err(Error::NotFound(identity.to_string())),
        }
    }

    /// Register or replace the payout wallet
    pub async fn set_wallet(&self, identity: &str, wallet_address: &str) -> Result<UserAccount> {
        let identity = required("identity", identity)?;
        let wallet_address = required("walletAddress", wallet_address)?;
        info!("Setting wallet for {}", identity);

        self.repo
            .set_wallet(identity, wallet_address)
            .await
            .with_context(|| format!("Failed to set wallet for {}", identity))?
            .ok_or_else(|| Error::NotFound(identity.to_string()))
    }

    /// Check that the store answers
    pub async fn ping(&self) -> Result<()> {
        self.repo.ping().await
    }
}

impl Default for AccountService {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim a required field, rejecting blank values
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{} is required", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_and_rejects_blank() {
        assert_eq!(required("identity", "  u1 ").unwrap(), "u1");
        assert!(matches!(required("identity", ""), Err(Error::InvalidArgument(_))));
        assert!(matches!(required("identity", "   "), Err(Error::InvalidArgument(_))));
    }
}
