//! Repository for user account data

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::clock::{Clock, SystemClock};
use common::db::{init_db_pool, DbPool};
use common::error::{Error, Result};
use common::model::user::{Points, ProfileUpdate, UserAccount};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sqlx::{postgres::PgRow, Row};
use tracing::{debug, info};

/// Result of a conditional reward update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The condition held and the reward was written
    Applied(UserAccount),
    /// The condition failed; the account is returned unchanged
    Rejected(UserAccount),
    /// No account exists for the identity
    Missing,
}

/// User repository trait defining the interface for account storage
///
/// Every mutating method is a single atomic write. The `claim_*` methods fold
/// the eligibility check into that write, so two concurrent claims for the
/// same identity cannot both succeed.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account or merge the supplied profile fields into the existing one
    async fn upsert_profile(&self, identity: &str, profile: &ProfileUpdate) -> Result<UserAccount>;

    /// Get an account by identity
    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserAccount>>;

    /// Atomically add `amount` to the balance
    async fn increment_balance(&self, identity: &str, amount: Points) -> Result<Option<UserAccount>>;

    /// Credit a wheel prize if the last spin is at least `cooldown` before `now`
    async fn claim_spin(
        &self,
        identity: &str,
        reward: Points,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<ClaimOutcome>;

    /// Credit the daily bonus if nothing was claimed since `day_start`
    async fn claim_daily(
        &self,
        identity: &str,
        amount: Points,
        now: DateTime<Utc>,
        day_start: DateTime<Utc>,
    ) -> Result<ClaimOutcome>;

    /// Credit the subscription bonus if it was never granted
    async fn claim_subscription(&self, identity: &str, amount: Points) -> Result<ClaimOutcome>;

    /// Overwrite the payout wallet
    async fn set_wallet(&self, identity: &str, wallet_address: &str) -> Result<Option<UserAccount>>;

    /// Check that the store is reachable
    async fn ping(&self) -> Result<()>;
}

/// In-memory repository for user accounts
pub struct InMemoryUserRepository {
    /// Accounts by identity
    pub users: DashMap<String, UserAccount>,
    /// Time source for the store-maintained timestamps
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRepository {
    /// Create a new in-memory user repository
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a repository stamping records with the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: DashMap::new(),
            clock,
        }
    }

    /// Run `apply` on the account under its shard lock if `eligible` holds
    fn claim_with<E, A>(&self, identity: &str, eligible: E, apply: A) -> ClaimOutcome
    where
        E: FnOnce(&UserAccount) -> bool,
        A: FnOnce(&mut UserAccount),
    {
        match self.users.get_mut(identity) {
            Some(mut user) => {
                if !eligible(user.value()) {
                    return ClaimOutcome::Rejected(user.value().clone());
                }
                apply(user.value_mut());
                ClaimOutcome::Applied(user.value().clone())
            }
            None => ClaimOutcome::Missing,
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert_profile(&self, identity: &str, profile: &ProfileUpdate) -> Result<UserAccount> {
        let now = self.clock.now();
        let user = match self.users.entry(identity.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().apply_profile(profile, now);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry
                .insert(UserAccount::new(identity.to_string(), profile, now))
                .clone(),
        };
        Ok(user)
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserAccount>> {
        Ok(self.users.get(identity).map(|u| u.clone()))
    }

    async fn increment_balance(&self, identity: &str, amount: Points) -> Result<Option<UserAccount>> {
        let now = self.clock.now();
        Ok(self.users.get_mut(identity).map(|mut user| {
            user.credit(amount, now);
            user.clone()
        }))
    }

    async fn claim_spin(
        &self,
        identity: &str,
        reward: Points,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<ClaimOutcome> {
        Ok(self.claim_with(
            identity,
            |user| user.can_spin(now, cooldown),
            |user| {
                user.credit(reward, now);
                user.last_spin_at = Some(now);
            },
        ))
    }

    async fn claim_daily(
        &self,
        identity: &str,
        amount: Points,
        now: DateTime<Utc>,
        day_start: DateTime<Utc>,
    ) -> Result<ClaimOutcome> {
        Ok(self.claim_with(
            identity,
            |user| !user.claimed_daily_since(day_start),
            |user| {
                user.credit(amount, now);
                user.last_daily_at = Some(now);
            },
        ))
    }

    async fn claim_subscription(&self, identity: &str, amount: Points) -> Result<ClaimOutcome> {
        let now = self.clock.now();
        Ok(self.claim_with(
            identity,
            |user| !user.subscribed,
            |user| {
                user.credit(amount, now);
                user.subscribed = true;
            },
        ))
    }

    async fn set_wallet(&self, identity: &str, wallet_address: &str) -> Result<Option<UserAccount>> {
        let now = self.clock.now();
        Ok(self.users.get_mut(identity).map(|mut user| {
            user.wallet_address = Some(wallet_address.to_string());
            user.updated_at = now;
            user.clone()
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Columns selected for every user row
const USER_COLUMNS: &str = "identity, display_name, handle, avatar_url, balance, \
     last_spin_at, last_daily_at, subscribed, wallet_address, created_at, updated_at";

/// PostgreSQL repository for user accounts
pub struct PostgresUserRepository {
    /// Database connection pool
    pool: DbPool,
}

impl PostgresUserRepository {
    /// Create a repository over an existing pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `database_url`
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self> {
        let pool = init_db_pool(database_url, pool_size).await?;
        Ok(Self::new(pool))
    }

    /// Create a new PostgreSQL user repository with configuration
    pub async fn with_config(config: &crate::config::AccountServiceConfig) -> Result<Self> {
        info!("Connecting to PostgreSQL database with pool size: {}", config.db_pool_size);
        Self::connect(&config.database_url, config.db_pool_size).await
    }

    /// The underlying pool, for migrations
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Classify the row returned by a conditional `UPDATE ... RETURNING`
    async fn claim_row(&self, identity: &str, row: Option<PgRow>) -> Result<ClaimOutcome> {
        match row {
            Some(row) => Ok(ClaimOutcome::Applied(user_from_row(&row)?)),
            None => Ok(match self.find_by_identity(identity).await? {
                Some(user) => ClaimOutcome::Rejected(user),
                None => ClaimOutcome::Missing,
            }),
        }
    }
}

/// Map a `users` row to the domain model
fn user_from_row(row: &PgRow) -> Result<UserAccount> {
    Ok(UserAccount {
        identity: row.try_get("identity")?,
        display_name: row.try_get("display_name")?,
        handle: row.try_get("handle")?,
        avatar_url: row.try_get("avatar_url")?,
        balance: row.try_get("balance")?,
        last_spin_at: row.try_get("last_spin_at")?,
        last_daily_at: row.try_get("last_daily_at")?,
        subscribed: row.try_get("subscribed")?,
        wallet_address: row.try_get("wallet_address")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn upsert_profile(&self, identity: &str, profile: &ProfileUpdate) -> Result<UserAccount> {
        debug!("Upserting user profile in database: {}", identity);

        let sql = format!(
            "INSERT INTO users (identity, display_name, handle, avatar_url)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (identity)
             DO UPDATE SET
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                handle = COALESCE(EXCLUDED.handle, users.handle),
                avatar_url = COALESCE(EXCLUDED.avatar_url, users.avatar_url),
                updated_at = NOW()
             RETURNING {}",
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(identity)
            .bind(profile.display_name.as_deref())
            .bind(profile.handle.as_deref())
            .bind(profile.avatar_url.as_deref())
            .fetch_one(&self.pool)
            .await?;

        user_from_row(&row)
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserAccount>> {
        debug!("Getting user from database: {}", identity);

        let sql = format!("SELECT {} FROM users WHERE identity = $1", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn increment_balance(&self, identity: &str, amount: Points) -> Result<Option<UserAccount>> {
        debug!("Incrementing balance by {} for {}", amount, identity);

        let sql = format!(
            "UPDATE users SET balance = balance + $2, updated_at = NOW()
             WHERE identity = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(identity)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn claim_spin(
        &self,
        identity: &str,
        reward: Points,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<ClaimOutcome> {
        debug!("Claiming spin reward {} for {}", reward, identity);

        let sql = format!(
            "UPDATE users SET balance = balance + $2, last_spin_at = $3, updated_at = NOW()
             WHERE identity = $1 AND (last_spin_at IS NULL OR last_spin_at <= $4)
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(identity)
            .bind(reward)
            .bind(now)
            .bind(now - cooldown)
            .fetch_optional(&self.pool)
            .await?;

        self.claim_row(identity, row).await
    }

    async fn claim_daily(
        &self,
        identity: &str,
        amount: Points,
        now: DateTime<Utc>,
        day_start: DateTime<Utc>,
    ) -> Result<ClaimOutcome> {
        debug!("Claiming daily bonus for {}", identity);

        let sql = format!(
            "UPDATE users SET balance = balance + $2, last_daily_at = $3, updated_at = NOW()
             WHERE identity = $1 AND (last_daily_at IS NULL OR last_daily_at < $4)
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(identity)
            .bind(amount)
            .bind(now)
            .bind(day_start)
            .fetch_optional(&self.pool)
            .await?;

        self.claim_row(identity, row).await
    }

    async fn claim_subscription(&self, identity: &str, amount: Points) -> Result<ClaimOutcome> {
        debug!("Claiming subscription bonus for {}", identity);

        let sql = format!(
            "UPDATE users SET balance = balance + $2, subscribed = TRUE, updated_at = NOW()
             WHERE identity = $1 AND subscribed = FALSE
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(identity)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await?;

        self.claim_row(identity, row).await
    }

    async fn set_wallet(&self, identity: &str, wallet_address: &str) -> Result<Option<UserAccount>> {
        debug!("Setting wallet for {}", identity);

        let sql = format!(
            "UPDATE users SET wallet_address = $2, updated_at = NOW()
             WHERE identity = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(identity)
            .bind(wallet_address)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(Error::Database)
    }
}
