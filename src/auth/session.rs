use crate::auth::rbac::Role;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user's profile as persisted under `currentUser`.
///
/// `role` keeps the backend's string verbatim so a role this client does not
/// know still round-trips; it simply maps to no capabilities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role)
    }
}

/// Bearer session: profile, opaque token and expiry, always held together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub profile: UserProfile,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(profile: UserProfile, token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            profile,
            token,
            expires_at,
        }
    }

    /// Session expiring `lifetime_seconds` after `issued_at`.
    pub fn issued_at(
        profile: UserProfile,
        token: String,
        issued_at: DateTime<Utc>,
        lifetime_seconds: i64,
    ) -> Self {
        Self::new(profile, token, issued_at + Duration::seconds(lifetime_seconds))
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiry is inclusive: a session whose instant equals `now` is over.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.role()
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
