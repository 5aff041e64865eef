//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (hero, filters, listing grid)
//! GET  /health                  - Health check
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action
//! GET  /auth/register           - Register page
//! POST /auth/register           - Register action
//! POST /auth/logout             - Logout action
//!
//! # Listings
//! GET  /listings/new            - New listing form (requires auth)
//! POST /listings                - Create listing (requires auth, multipart)
//! POST /listings/{id}/feature   - Promote to featured (admin only)
//! POST /listings/{id}/delete    - Delete listing (admin only)
//! ```

pub mod auth;
pub mod home;
pub mod listings;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Body limit for listing submissions (up to 10 images per listing).
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the listing routes router.
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(listings::create))
        .route("/new", get(listings::new_page))
        .route("/{id}/feature", post(listings::feature))
        .route("/{id}/delete", post(listings::delete))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Listing routes
        .nest("/listings", listing_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
