//! Request bodies
//!
//! Fields are camelCase. The names used by earlier clients (`telegramId`,
//! `first_name`, `username`, `photo_url`, `wallet`) are accepted as aliases.
//! Missing fields deserialize to `None`; the account service decides whether
//! that is an error.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::ToSchema;

/// Body of `POST /api/users/init`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitUserRequest {
    /// External platform identity
    #[serde(default, alias = "telegramId", deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>)]
    pub identity: Option<String>,
    /// Display name
    #[serde(default, alias = "first_name")]
    pub display_name: Option<String>,
    /// Platform handle
    #[serde(default, alias = "username")]
    pub handle: Option<String>,
    /// Avatar URL
    #[serde(default, alias = "photo_url")]
    pub avatar_url: Option<String>,
}

/// Body of the reward endpoints
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRequest {
    /// External platform identity
    #[serde(default, alias = "telegramId", deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>)]
    pub identity: Option<String>,
}

/// Body of `POST /api/users/wallet`
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetWalletRequest {
    /// External platform identity
    #[serde(default, alias = "telegramId", deserialize_with = "string_or_number")]
    #[schema(value_type = Option<String>)]
    pub identity: Option<String>,
    /// Payout wallet address
    #[serde(default, alias = "wallet")]
    pub wallet_address: Option<String>,
}

impl InitUserRequest {
    /// Identity or an empty string when absent
    pub fn identity(&self) -> &str {
        self.identity.as_deref().unwrap_or_default()
    }
}

impl IdentityRequest {
    /// Identity or an empty string when absent
    pub fn identity(&self) -> &str {
        self.identity.as_deref().unwrap_or_default()
    }
}

impl SetWalletRequest {
    /// Identity or an empty string when absent
    pub fn identity(&self) -> &str {
        self.identity.as_deref().unwrap_or_default()
    }

    /// Wallet or an empty string when absent
    pub fn wallet_address(&self) -> &str {
        self.wallet_address.as_deref().unwrap_or_default()
    }
}

/// Platform IDs arrive as JSON numbers from some clients
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_fields() {
        let request: InitUserRequest = serde_json::from_str(
            r#"{"identity":"u1","displayName":"Alice","handle":"alice","avatarUrl":"http://img/a.png"}"#,
        )
        .unwrap();
        assert_eq!(request.identity(), "u1");
        assert_eq!(request.display_name.as_deref(), Some("Alice"));
        assert_eq!(request.handle.as_deref(), Some("alice"));
        assert_eq!(request.avatar_url.as_deref(), Some("http://img/a.png"));
    }

    #[test]
    fn test_legacy_aliases() {
        let request: InitUserRequest = serde_json::from_str(
            r#"{"telegramId":123456789,"first_name":"Bob","username":"bob","photo_url":"p"}"#,
        )
        .unwrap();
        assert_eq!(request.identity(), "123456789");
        assert_eq!(request.display_name.as_deref(), Some("Bob"));
        assert_eq!(request.handle.as_deref(), Some("bob"));

        let request: SetWalletRequest =
            serde_json::from_str(r#"{"telegramId":"u1","wallet":"0xabc"}"#).unwrap();
        assert_eq!(request.identity(), "u1");
        assert_eq!(request.wallet_address(), "0xabc");
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let request: IdentityRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.identity(), "");

        let request: IdentityRequest = serde_json::from_str(r#"{"identity":null}"#).unwrap();
        assert_eq!(request.identity(), "");
    }

    #[test]
    fn test_rejects_non_scalar_identity() {
        assert!(serde_json::from_str::<IdentityRequest>(r#"{"identity":["u1"]}"#).is_err());
    }
}
