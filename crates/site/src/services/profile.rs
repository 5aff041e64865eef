//! Profile resolution.
//!
//! Turns an authenticated identity into a [`CurrentUser`] by reading the
//! matching profile row, lazily creating it on first access. Resolution
//! never fails: backend errors are logged and the caller still gets a usable
//! identity with a best-effort name and a `user` role, so a flaky profiles
//! table cannot block sign-in.

use tracing::{instrument, warn};

use caravanhub_core::Role;

use crate::models::{CurrentUser, Profile, ProfileRow};
use crate::supabase::{AuthUser, SupabaseClient};

/// Display name used when the identity has neither metadata name nor email.
const ANONYMOUS_NAME: &str = "User";

/// Resolve an authenticated identity to an application user.
///
/// Reads the profile row keyed by the identity id. If absent, upserts a new
/// row (name from sign-up metadata or the email local-part, role `user`) and
/// re-reads it. The stored role string is normalized through [`Role::parse`],
/// so unrecognized values collapse to `user` rather than granting access.
#[instrument(skip(client, auth_user, access_token), fields(profile_id = %auth_user.id))]
pub async fn resolve(
    client: &SupabaseClient,
    auth_user: &AuthUser,
    access_token: &str,
) -> CurrentUser {
    let email = auth_user.email.clone().unwrap_or_default();
    let fallback_name = fallback_name(auth_user, &email);

    let mut profile = match client.get_profile(access_token, auth_user.id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "profile fetch failed");
            None
        }
    };

    // First authenticated access: create the profile now, then re-read it so
    // a database-assigned role (e.g. a pre-provisioned admin) wins.
    if profile.is_none() {
        let row = ProfileRow {
            id: auth_user.id,
            name: fallback_name.clone(),
            role: Role::User.as_str().to_string(),
        };
        match client.upsert_profile(access_token, &row).await {
            Ok(()) => match client.get_profile(access_token, auth_user.id).await {
                Ok(re_read) => profile = re_read,
                Err(e) => warn!(error = %e, "profile re-read after upsert failed"),
            },
            Err(e) => warn!(error = %e, "profile upsert failed"),
        }
    }

    let (name, role) = profile.map(Profile::from).map_or_else(
        || (fallback_name.clone(), Role::User),
        |profile| {
            let name = if profile.name.trim().is_empty() {
                fallback_name.clone()
            } else {
                profile.name
            };
            (name, profile.role)
        },
    );

    CurrentUser {
        id: auth_user.id,
        name,
        email,
        role,
        access_token: access_token.to_string(),
    }
}

/// Best-effort display name for an identity without a profile: sign-up
/// metadata first, then the email local-part.
fn fallback_name(auth_user: &AuthUser, email: &str) -> String {
    if let Some(name) = auth_user.metadata_name() {
        return name.to_string();
    }
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .map_or_else(|| ANONYMOUS_NAME.to_string(), ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn auth_user(email: Option<&str>, metadata: serde_json::Value) -> AuthUser {
        serde_json::from_value(serde_json::json!({
            "id": "8b7c3f1e-0000-4000-8000-000000000001",
            "email": email,
            "user_metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn test_fallback_name_prefers_metadata() {
        let user = auth_user(Some("sam@example.com"), serde_json::json!({"name": "Sam"}));
        assert_eq!(fallback_name(&user, "sam@example.com"), "Sam");
    }

    #[test]
    fn test_fallback_name_uses_email_local_part() {
        let user = auth_user(Some("sam.carter@example.com"), serde_json::json!({}));
        assert_eq!(fallback_name(&user, "sam.carter@example.com"), "sam.carter");
    }

    #[test]
    fn test_fallback_name_anonymous_without_email() {
        let user = auth_user(None, serde_json::json!({}));
        assert_eq!(fallback_name(&user, ""), "User");
    }
}
