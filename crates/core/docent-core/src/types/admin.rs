//! Admin dashboard and account types

use super::chat::ChatMessage;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular account
    #[default]
    User,
    /// Administrator
    Admin,
}

impl UserRole {
    /// Wire string for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = crate::DocentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            other => Err(crate::DocentError::validation(format!(
                "unknown role '{}', expected 'user' or 'admin'",
                other
            ))),
        }
    }
}

/// An account as returned by the API
///
/// `/user` answers with the session payload, which carries the ID under
/// `user_id`; the admin user list uses `id`. Both decode into `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Account ID
    #[serde(alias = "user_id")]
    pub id: String,

    /// Email address
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Account role
    #[serde(default)]
    pub role: UserRole,

    /// Registration time
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// One day of usage in the dashboard transition chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// Day, `YYYY-MM-DD`
    pub date: String,

    /// Exchanges on that day
    #[serde(default)]
    pub chat_count: u64,

    /// Tokens spent on that day
    #[serde(default)]
    pub token_usage: u64,
}

/// Admin dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboard {
    /// Exchanges in the last 24 hours
    #[serde(default)]
    pub last_24h_chat_count: u64,

    /// Per-day usage for the last seven days
    #[serde(default)]
    pub last_7days_transition: Vec<DailyUsage>,

    /// Most recent exchanges
    #[serde(default)]
    pub latest_chat_list: Vec<ChatMessage>,

    /// All registered accounts
    #[serde(default)]
    pub user_list: Vec<UserInfo>,
}

/// A search index type
///
/// The user-facing listing carries only `id` and `folder_name`; the admin
/// listing adds ordering and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndexType {
    /// Index type ID
    pub id: String,

    /// Human-readable folder name
    pub folder_name: String,

    /// Position in the configured ordering
    #[serde(default)]
    pub display_order: Option<i64>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
