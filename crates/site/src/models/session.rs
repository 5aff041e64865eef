//! Session-related types.
//!
//! Types stored in the session for authentication state. The session is the
//! only place identity lives; handlers receive it explicitly through the
//! auth extractors rather than through any ambient global.

use serde::{Deserialize, Serialize};

use caravanhub_core::{ProfileId, Role};

/// Session-stored user identity.
///
/// Built by the profile resolver after a successful sign-in and torn down on
/// sign-out. The access token is forwarded to the backend on writes so
/// row-level security applies to the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Auth identity id (also the profile id).
    pub id: ProfileId,
    /// Display name from the profile (email local-part fallback).
    pub name: String,
    /// Account email address.
    pub email: String,
    /// Normalized application role.
    pub role: Role,
    /// Backend access token for this session.
    pub access_token: String,
}

impl CurrentUser {
    /// Whether this user may feature and delete listings.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
