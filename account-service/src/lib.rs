//! Account service for user balances, rewards and payout wallets

pub mod config;
pub mod repository;
pub mod rules;
pub mod service;

pub use config::{AccountServiceConfig, StoreKind};
pub use repository::{ClaimOutcome, InMemoryUserRepository, PostgresUserRepository, UserRepository};
pub use rules::RewardRules;
pub use service::{AccountService, SpinResult};
