//! Account domain types.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account primary key.
pub type AccountId = i64;

/// Role value for ordinary accounts.
pub const ROLE_COMMON: i32 = 1;
/// Role value for administrators.
pub const ROLE_ADMIN: i32 = 10;
/// Role value for the root account.
pub const ROLE_ROOT: i32 = 100;

/// Channel group assigned to accounts created without one.
pub const DEFAULT_GROUP: &str = "default";

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// May use the relay.
    #[default]
    Active,
    /// Exists but may not use the relay.
    Disabled,
    /// Soft-deleted: hidden from listings, still addressable by exact lookup.
    Deleted,
}

impl AccountStatus {
    /// Integer code persisted in the store.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Active => 1,
            Self::Disabled => 2,
            Self::Deleted => 3,
        }
    }

    /// Decode a persisted status code.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Active),
            2 => Some(Self::Disabled),
            3 => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Disabled => write!(f, "disabled"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// An account record as returned by the account store.
///
/// The shape is fixed: fields hidden by [`Visibility`] are empty strings,
/// never absent. Empty sensitive fields are skipped when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Primary key.
    pub id: AccountId,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC hash; empty unless requested with full visibility.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Name shown in the dashboard.
    pub display_name: String,
    /// Role code (see `ROLE_*`).
    pub role: i32,
    /// Lifecycle status.
    pub status: AccountStatus,
    /// Contact email.
    pub email: String,
    /// Personal access token; empty unless requested with sensitive visibility.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    /// Remaining allowance.
    pub quota: i64,
    /// Cumulative consumption.
    pub used_quota: i64,
    /// Cumulative relay call count.
    pub request_count: i64,
    /// Channel group.
    pub group: String,
    /// Referral code handed out by this account.
    pub aff_code: String,
    /// Account that invited this one, 0 when none.
    pub inviter_id: AccountId,
}

impl Account {
    /// Whether the account may use the relay.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Request to create an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    /// Unique login name.
    pub username: String,
    /// Plaintext password; hashed before it reaches the store.
    pub password: SecretString,
    /// Name shown in the dashboard; defaults to the username.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Role code; defaults to [`ROLE_COMMON`].
    #[serde(default)]
    pub role: Option<i32>,
    /// Initial quota.
    #[serde(default)]
    pub quota: i64,
    /// Channel group; defaults to [`DEFAULT_GROUP`].
    #[serde(default)]
    pub group: Option<String>,
    /// Personal access token.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl NewAccount {
    /// Create a request with a username and plaintext password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            display_name: None,
            email: None,
            role: None,
            quota: 0,
            group: None,
            access_token: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the initial quota.
    #[must_use]
    pub fn with_quota(mut self, quota: i64) -> Self {
        self.quota = quota;
        self
    }

    /// Set the channel group.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

/// Which sensitive fields a returned record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every field, including password hash and access token.
    Full,
    /// Password hash and access token emptied.
    Redacted,
}

impl Visibility {
    /// Visibility for an exact lookup with the given trust level.
    #[must_use]
    pub fn for_sensitive(include_sensitive: bool) -> Self {
        if include_sensitive {
            Self::Full
        } else {
            Self::Redacted
        }
    }

    /// Whether password hash and access token are exposed.
    #[must_use]
    pub fn exposes_sensitive(self) -> bool {
        self == Self::Full
    }
}

/// Sort key for account listings. Every key sorts descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderKey {
    /// Remaining quota.
    Quota,
    /// Consumed quota.
    UsedQuota,
    /// Relay call count.
    RequestCount,
    /// Primary key (default).
    #[default]
    Id,
}

impl OrderKey {
    /// Parse a listing order parameter. Unrecognised values fall back to [`OrderKey::Id`].
    #[must_use]
    pub fn from_param(param: &str) -> Self {
        match param {
            "quota" => Self::Quota,
            "used_quota" => Self::UsedQuota,
            "request_count" => Self::RequestCount,
            _ => Self::Id,
        }
    }

    /// Column the key sorts on.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::UsedQuota => "used_quota",
            Self::RequestCount => "request_count",
            Self::Id => "id",
        }
    }
}

/// Offset/limit window. `limit == 0` is an empty page, not "unlimited".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Rows to skip.
    pub offset: u32,
    /// Maximum rows to return.
    pub limit: u32,
}

impl Page {
    /// Create a page window.
    #[must_use]
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}
