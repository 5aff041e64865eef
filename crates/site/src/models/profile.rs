//! Profile domain and row types.
//!
//! A profile is the application-level user record (display name, role),
//! distinct from the raw auth identity. Rows are created lazily on first
//! authenticated access; the role is managed out-of-band in the database.

use serde::{Deserialize, Serialize};

use caravanhub_core::{ProfileId, Role};

/// Application profile (domain type).
#[derive(Debug, Clone)]
pub struct Profile {
    /// Matches the auth identity id.
    pub id: ProfileId,
    /// Display name.
    pub name: String,
    /// Normalized role.
    pub role: Role,
}

/// Row shape for the `profiles` table.
///
/// `role` stays a raw string on the wire; normalization happens through
/// [`Role::parse`] so unrecognized database values collapse to `user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: ProfileId,
    pub name: String,
    pub role: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: Role::parse(&row.role),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_normalized_on_conversion() {
        let row: ProfileRow = serde_json::from_str(
            r#"{"id": "8b7c3f1e-0000-4000-8000-000000000001", "name": "Sam", "role": " ADMIN "}"#,
        )
        .unwrap();
        let profile = Profile::from(row);
        assert_eq!(profile.role, Role::Admin);
    }

    #[test]
    fn test_unknown_role_collapses_to_user() {
        let row = ProfileRow {
            id: "8b7c3f1e-0000-4000-8000-000000000001".parse().unwrap(),
            name: "Sam".to_string(),
            role: "owner".to_string(),
        };
        assert_eq!(Profile::from(row).role, Role::User);
    }
}
