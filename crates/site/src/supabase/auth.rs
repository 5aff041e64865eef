//! GoTrue authentication calls.
//!
//! Email/password only; the auth provider owns credential storage,
//! confirmation emails, and token issuance.

use serde::Deserialize;
use tracing::instrument;

use caravanhub_core::ProfileId;

use super::{SupabaseClient, SupabaseError};

/// Authenticated identity as returned by the auth provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    /// Identity id; also the profile id.
    pub id: ProfileId,
    /// Account email. Present for email/password accounts.
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form metadata supplied at sign-up (e.g., display name).
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl AuthUser {
    /// Display name from sign-up metadata, when one was supplied.
    #[must_use]
    pub fn metadata_name(&self) -> Option<&str> {
        self.user_metadata
            .get("name")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// An authenticated session: access token plus the identity it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// Outcome of a sign-up call.
///
/// When email confirmation is required the provider returns the created
/// identity without a session; the user signs in after confirming.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    /// The created identity, when the provider reported one.
    pub user: Option<AuthUser>,
    /// A live session, when the project auto-confirms sign-ups.
    pub session: Option<AuthSession>,
}

/// Error body shapes used by the auth provider.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Raw sign-up response: either a bare user object or a full session.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
    // Bare-user shape: the identity fields appear at the top level.
    #[serde(default)]
    id: Option<ProfileId>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl SupabaseClient {
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url())
    }

    async fn auth_error(response: reqwest::Response) -> SupabaseError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<AuthErrorBody>(&body)
            .ok()
            .and_then(|b| b.error_description.or(b.msg).or(b.error))
            .unwrap_or_else(|| format!("auth request failed with status {status}"));
        SupabaseError::Auth(message)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Auth` with the provider's message when the
    /// credentials are rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let response = self
            .http()
            .post(self.auth_url("token?grant_type=password"))
            .header("Authorization", self.bearer(None))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))
    }

    /// Sign up with email, password, and a display name stored in the
    /// identity metadata.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Auth` with the provider's message when the
    /// sign-up is rejected (e.g., email already registered).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpOutcome, SupabaseError> {
        let response = self
            .http()
            .post(self.auth_url("signup"))
            .header("Authorization", self.bearer(None))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "name": name },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }

        let raw: SignUpResponse = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;

        Ok(raw.into_outcome())
    }

    /// Invalidate the given session's tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; callers treat this as best
    /// effort since the local session is cleared regardless.
    #[instrument(skip(self, access_token))]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .post(self.auth_url("logout"))
            .header("Authorization", self.bearer(Some(access_token)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_error(response).await);
        }
        Ok(())
    }
}

impl SignUpResponse {
    fn into_outcome(self) -> SignUpOutcome {
        // Session shape: access token plus nested user.
        if let (Some(access_token), Some(user)) = (self.access_token, self.user.clone()) {
            return SignUpOutcome {
                user: Some(user.clone()),
                session: Some(AuthSession { access_token, user }),
            };
        }

        // Bare-user shape: identity fields at the top level.
        let user = self.user.or_else(|| {
            self.id.map(|id| AuthUser {
                id,
                email: self.email,
                user_metadata: self.user_metadata,
            })
        });

        SignUpOutcome {
            user,
            session: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_name() {
        let user: AuthUser = serde_json::from_str(
            r#"{
                "id": "8b7c3f1e-0000-4000-8000-000000000001",
                "email": "sam@example.com",
                "user_metadata": { "name": "Sam" }
            }"#,
        )
        .unwrap();
        assert_eq!(user.metadata_name(), Some("Sam"));
    }

    #[test]
    fn test_metadata_name_absent_or_blank() {
        let user: AuthUser = serde_json::from_str(
            r#"{
                "id": "8b7c3f1e-0000-4000-8000-000000000001",
                "user_metadata": { "name": "   " }
            }"#,
        )
        .unwrap();
        assert_eq!(user.metadata_name(), None);
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_signup_session_shape() {
        let raw: SignUpResponse = serde_json::from_str(
            r#"{
                "access_token": "tok",
                "user": {
                    "id": "8b7c3f1e-0000-4000-8000-000000000001",
                    "email": "sam@example.com",
                    "user_metadata": {}
                }
            }"#,
        )
        .unwrap();
        let outcome = raw.into_outcome();
        assert!(outcome.user.is_some());
        let session = outcome.session.unwrap();
        assert_eq!(session.access_token, "tok");
    }

    #[test]
    fn test_signup_bare_user_shape() {
        // Confirmation-required projects return the identity without a session.
        let raw: SignUpResponse = serde_json::from_str(
            r#"{
                "id": "8b7c3f1e-0000-4000-8000-000000000001",
                "email": "sam@example.com",
                "user_metadata": { "name": "Sam" }
            }"#,
        )
        .unwrap();
        let outcome = raw.into_outcome();
        assert!(outcome.session.is_none());
        let user = outcome.user.unwrap();
        assert_eq!(user.email.as_deref(), Some("sam@example.com"));
        assert_eq!(user.metadata_name(), Some("Sam"));
    }
}
