//! Authentication route handlers.
//!
//! Handles login, registration, and logout via the hosted auth provider.
//! Roles live on the profile row and are never taken from form input.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use caravanhub_core::Role;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, ProfileRow, session_keys};
use crate::services::profile;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map a redirect error code to a display message.
fn error_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid email or password.".to_string(),
        "missing_fields" => "Please fill in every field.".to_string(),
        "password_too_short" => "Password must be at least 8 characters.".to_string(),
        "email_taken" => "An account with this email already exists.".to_string(),
        "session" => "Could not start a session, please try again.".to_string(),
        _ => "Something went wrong, please try again.".to_string(),
    }
}

/// Map a redirect success code to a display message.
fn success_message(code: &str) -> String {
    match code {
        "registered" => "Account created. Check your inbox to confirm your email.".to_string(),
        "signed_out" => "Signed out.".to_string(),
        _ => code.to_string(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Registration success page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_success.html")]
pub struct RegisterSuccessTemplate {
    pub email: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
    }
}

/// Handle login form submission.
///
/// Authenticates against the hosted auth provider, resolves the profile
/// (creating it on first sign-in), and stores the identity in the session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Redirect::to("/auth/login?error=missing_fields").into_response();
    }

    match state
        .supabase()
        .sign_in(form.email.trim(), &form.password)
        .await
    {
        Ok(auth_session) => {
            let user = profile::resolve(
                state.supabase(),
                &auth_session.user,
                &auth_session.access_token,
            )
            .await;

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/auth/login?error=session").into_response();
            }
            set_sentry_user(&user.id, Some(&user.email));

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {}", e);
            Redirect::to("/auth/login?error=credentials").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle registration form submission.
///
/// Creates the account with the auth provider (which sends the confirmation
/// email) and seeds the profile row. The profile upsert is best effort - it
/// can also be created lazily on first sign-in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let name = form.name.trim();
    let email = form.email.trim();

    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Redirect::to("/auth/register?error=missing_fields").into_response();
    }
    if form.password.len() < 8 {
        return Redirect::to("/auth/register?error=password_too_short").into_response();
    }

    match state.supabase().sign_up(email, &form.password, name).await {
        Ok(outcome) => {
            // Seed the profile row so the display name is in place before
            // first sign-in. Row-level security requires the user's own
            // token, so this only works when sign-up returned a session.
            if let Some(auth_session) = &outcome.session {
                let row = ProfileRow {
                    id: auth_session.user.id,
                    name: name.to_string(),
                    role: Role::User.as_str().to_string(),
                };
                if let Err(e) = state
                    .supabase()
                    .upsert_profile(&auth_session.access_token, &row)
                    .await
                {
                    tracing::warn!("profile upsert after sign-up failed: {}", e);
                }

                // Auto-confirming project: sign the user straight in.
                let user = profile::resolve(
                    state.supabase(),
                    &auth_session.user,
                    &auth_session.access_token,
                )
                .await;
                if let Err(e) = set_current_user(&session, &user).await {
                    tracing::error!("Failed to set session after sign-up: {}", e);
                    return Redirect::to("/auth/login?error=session").into_response();
                }
                set_sentry_user(&user.id, Some(&user.email));
                return Redirect::to("/").into_response();
            }

            // Confirmation required: tell them to check their inbox.
            RegisterSuccessTemplate {
                email: outcome
                    .user
                    .and_then(|u| u.email)
                    .unwrap_or_else(|| email.to_string()),
            }
            .into_response()
        }
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            let error_msg = e.to_string();
            if error_msg.contains("already") || error_msg.contains("registered") {
                Redirect::to("/auth/register?error=email_taken").into_response()
            } else {
                Redirect::to("/auth/register?error=failed").into_response()
            }
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Revokes the backend session (best effort) and clears the local one.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Ok(Some(user)) = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        && let Err(e) = state.supabase().sign_out(&user.access_token).await
    {
        tracing::warn!("Failed to revoke backend session: {}", e);
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }
    clear_sentry_user();

    Redirect::to("/").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_user_facing() {
        assert_eq!(error_message("credentials"), "Invalid email or password.");
        assert_eq!(
            error_message("unknown_code"),
            "Something went wrong, please try again."
        );
    }
}
