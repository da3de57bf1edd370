//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidepool_core::{Email, UserId};

/// A user profile as held by the session store and mirrored to persistence.
///
/// `created_at` serializes as an RFC 3339 / ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique user ID. Unique within the mock identity space.
    pub id: UserId,
    /// Email address; unique within the mock identity space.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    /// Whether this user may access administrative surfaces.
    #[serde(default)]
    pub is_admin: bool,
}

impl UserProfile {
    /// First and last name joined for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A partial profile update.
///
/// Only present fields are applied. Email is deliberately absent: it is not
/// mutable through the update path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
}

impl ProfileUpdate {
    /// Merge the present fields into `profile`, leaving the rest untouched.
    pub fn apply_to(self, profile: &mut UserProfile) {
        if let Some(first_name) = self.first_name {
            profile.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            profile.last_name = last_name;
        }
        if let Some(avatar_url) = self.avatar_url {
            profile.avatar_url = Some(avatar_url);
        }
        if let Some(phone_number) = self.phone_number {
            profile.phone_number = Some(phone_number);
        }
        if let Some(address) = self.address {
            profile.address = Some(address);
        }
    }
}
