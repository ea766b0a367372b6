//! User account model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use crate::utoipa::ToSchema;

/// Balance amount in reward points
pub type Points = i64;

/// User account, one per external platform identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// External platform user ID, the primary key
    pub identity: String,
    /// Display name
    pub display_name: Option<String>,
    /// Platform handle
    pub handle: Option<String>,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Accrued points, never negative
    #[cfg_attr(feature = "utoipa", schema(value_type = i64))]
    pub balance: Points,
    /// Last successful wheel spin
    pub last_spin_at: Option<DateTime<Utc>>,
    /// Last successful daily claim
    pub last_daily_at: Option<DateTime<Utc>>,
    /// Whether the subscription bonus was granted
    pub subscribed: bool,
    /// Registered payout wallet
    pub wallet_address: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create a fresh account with a zero balance
    pub fn new(identity: String, profile: &ProfileUpdate, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            display_name: profile.display_name.clone(),
            handle: profile.handle.clone(),
            avatar_url: profile.avatar_url.clone(),
            balance: 0,
            last_spin_at: None,
            last_daily_at: None,
            subscribed: false,
            wallet_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the profile fields that the update supplies
    pub fn apply_profile(&mut self, profile: &ProfileUpdate, now: DateTime<Utc>) {
        if let Some(display_name) = &profile.display_name {
            self.display_name = Some(display_name.clone());
        }
        if let Some(handle) = &profile.handle {
            self.handle = Some(handle.clone());
        }
        if let Some(avatar_url) = &profile.avatar_url {
            self.avatar_url = Some(avatar_url.clone());
        }
        self.updated_at = now;
    }

    /// Add points to the balance
    pub fn credit(&mut self, amount: Points, now: DateTime<Utc>) {
        self.balance = self.balance.saturating_add(amount);
        self.updated_at = now;
    }

    /// Instant at which the next spin unlocks, `None` if it never spun
    pub fn next_spin_at(&self, cooldown: Duration) -> Option<DateTime<Utc>> {
        self.last_spin_at.map(|last| last + cooldown)
    }

    /// Whether a spin made at `now` is past the cooldown
    pub fn can_spin(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        match self.next_spin_at(cooldown) {
            Some(unlock_at) => now >= unlock_at,
            None => true,
        }
    }

    /// Whether the daily reward was already claimed in the day starting at `day_start`
    pub fn claimed_daily_since(&self, day_start: DateTime<Utc>) -> bool {
        matches!(self.last_daily_at, Some(last) if last >= day_start)
    }
}

/// Profile fields supplied on init
///
/// Empty and whitespace-only values are dropped on construction, so a `None`
/// here always means "keep what is stored".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Display name
    pub display_name: Option<String>,
    /// Platform handle
    pub handle: Option<String>,
    /// Avatar URL
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// Build an update, discarding blank values
    pub fn new(
        display_name: Option<String>,
        handle: Option<String>,
        avatar_url: Option<String>,
    ) -> Self {
        Self {
            display_name: non_blank(display_name),
            handle: non_blank(handle),
            avatar_url: non_blank(avatar_url),
        }
    }

    /// Whether the update carries no field at all
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.handle.is_none() && self.avatar_url.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_profile_update_drops_blank_values() {
        let update = ProfileUpdate::new(
            Some("  Alice ".to_string()),
            Some("   ".to_string()),
            Some(String::new()),
        );
        assert_eq!(update.display_name.as_deref(), Some("Alice"));
        assert_eq!(update.handle, None);
        assert_eq!(update.avatar_url, None);
        assert!(!update.is_empty());
        assert!(ProfileUpdate::new(None, Some(String::new()), None).is_empty());
    }

    #[test]
    fn test_apply_profile_keeps_unsupplied_fields() {
        let first = ProfileUpdate::new(Some("Alice".into()), Some("alice".into()), Some("http://a/1.png".into()));
        let mut user = UserAccount::new("u1".to_string(), &first, at(10, 0));

        let second = ProfileUpdate::new(Some("Alicia".into()), None, Some(String::new()));
        user.apply_profile(&second, at(11, 0));

        assert_eq!(user.display_name.as_deref(), Some("Alicia"));
        assert_eq!(user.handle.as_deref(), Some("alice"));
        assert_eq!(user.avatar_url.as_deref(), Some("http://a/1.png"));
        assert_eq!(user.created_at, at(10, 0));
        assert_eq!(user.updated_at, at(11, 0));
    }

    #[test]
    fn test_spin_eligibility() {
        let mut user = UserAccount::new("u1".to_string(), &ProfileUpdate::default(), at(0, 0));
        let cooldown = Duration::hours(6);
        assert!(user.can_spin(at(0, 0), cooldown));

        user.last_spin_at = Some(at(1, 0));
        assert!(!user.can_spin(at(6, 59), cooldown));
        assert!(user.can_spin(at(7, 0), cooldown));
        assert_eq!(user.next_spin_at(cooldown), Some(at(7, 0)));
    }

    #[test]
    fn test_daily_claim_window() {
        let mut user = UserAccount::new("u1".to_string(), &ProfileUpdate::default(), at(0, 0));
        assert!(!user.claimed_daily_since(at(0, 0)));

        user.last_daily_at = Some(at(9, 30));
        assert!(user.claimed_daily_since(at(0, 0)));
        assert!(!user.claimed_daily_since(at(9, 31)));
    }

    #[test]
    fn test_serializes_camel_case() {
        let user = UserAccount::new("u1".to_string(), &ProfileUpdate::default(), at(0, 0));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["identity"], "u1");
        assert_eq!(json["balance"], 0);
        assert!(json["walletAddress"].is_null());
        assert!(json["lastSpinAt"].is_null());
        assert_eq!(json["subscribed"], false);
        assert!(json.get("createdAt").is_some());
    }
}
