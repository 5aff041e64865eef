//! Profile role.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Application role attached to a profile.
///
/// Roles are managed in the backend database; there is no in-app elevation
/// path. Serialized lowercase to match the `profiles.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    /// Normalize a raw role value from the backend.
    ///
    /// Trims and lowercases before matching. Anything that is not exactly
    /// `admin` collapses to [`Role::User`] - unrecognized values must never
    /// grant admin access.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// The role name as stored in the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Whether this role may feature and delete listings.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
