//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use caravanhub_core::{Standard, StandardFilter};

use crate::filters;
use crate::gallery::Carousel;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Listing};
use crate::state::AppState;

/// Hero location shown before any listing has been featured.
const DEFAULT_HERO_LOCATION: &str = "Whitby, North Yorkshire";

// =============================================================================
// Listing and Hero Views
// =============================================================================

/// Listing display data for templates.
#[derive(Clone)]
pub struct ListingView {
    pub id: String,
    pub title: String,
    pub standard: String,
    /// Lowercased tier used as a CSS badge class.
    pub standard_class: String,
    pub location: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    /// Images with the placeholder substituted when the listing has none.
    pub images: Vec<String>,
    pub photo_count: usize,
    pub listed_when: String,
    pub is_featured: bool,
}

impl ListingView {
    fn from_listing(listing: &Listing, now: DateTime<Utc>) -> Self {
        let carousel = Carousel::new(&listing.images);
        Self {
            id: listing.id.to_string(),
            title: listing.title.clone(),
            standard: listing.standard.to_string(),
            standard_class: listing.standard.as_str().to_lowercase(),
            location: listing.location.clone(),
            contact_email: listing.contact_email.clone(),
            contact_phone: listing.contact_phone.clone(),
            photo_count: carousel.len(),
            images: carousel.images().to_vec(),
            listed_when: format_when(listing.created_at, now),
            is_featured: listing.is_featured,
        }
    }
}

/// Hero card data: the featured listing, or an invitation to pick one.
#[derive(Clone)]
pub struct HeroView {
    pub title: String,
    pub location: String,
    pub images: Vec<String>,
    pub has_featured: bool,
}

impl HeroView {
    fn from_featured(featured: Option<&Listing>) -> Self {
        featured.map_or_else(
            || Self {
                title: "Pick a listing".to_string(),
                location: DEFAULT_HERO_LOCATION.to_string(),
                images: Carousel::new(&[]).images().to_vec(),
                has_featured: false,
            },
            |listing| Self {
                title: listing.title.clone(),
                location: listing.location.clone(),
                images: Carousel::new(&listing.images).images().to_vec(),
                has_featured: true,
            },
        )
    }
}

// =============================================================================
// Relative Dates
// =============================================================================

/// Format a creation timestamp relative to now, in whole days.
fn format_when(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    #[allow(clippy::cast_precision_loss)]
    let days = ((created_at - now).num_minutes() as f64 / (60.0 * 24.0)).round();
    #[allow(clippy::cast_possible_truncation)]
    let days = days as i64;

    match days {
        0 => "today".to_string(),
        -1 => "yesterday".to_string(),
        1 => "tomorrow".to_string(),
        d if d < 0 => format!("{} days ago", -d),
        d => format!("in {d} days"),
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Search and filter query parameters.
#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    /// Free-text search over titles, locations, and contacts.
    pub q: Option<String>,
    /// Standard tab: All, Bronze, Silver, or Gold.
    pub standard: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Signed-in user, if any.
    pub user: Option<CurrentUser>,
    /// Hero card (featured listing or fallback).
    pub hero: HeroView,
    /// Listings passing the current query and standard filter.
    pub listings: Vec<ListingView>,
    /// Current search text (echoed into the search box).
    pub query: String,
    /// Current standard tab.
    pub standard_filter: String,
    /// All standard tier names, for the filter tabs.
    pub standards: Vec<String>,
}

/// Display the home page.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(browse): Query<BrowseQuery>,
) -> impl IntoResponse {
    let query = browse.q.unwrap_or_default();
    let standard_raw = browse.standard.unwrap_or_else(|| "All".to_string());
    let filter = StandardFilter::parse(&standard_raw);

    let now = Utc::now();
    let listings = state
        .store()
        .filtered(&query, filter)
        .await
        .iter()
        .map(|l| ListingView::from_listing(l, now))
        .collect();

    let featured = state.store().featured().await;
    let hero = HeroView::from_featured(featured.as_ref());

    HomeTemplate {
        user,
        hero,
        listings,
        query,
        standard_filter: filter.to_string(),
        standards: Standard::ALL.iter().map(ToString::to_string).collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_when_today() {
        let now = Utc::now();
        assert_eq!(format_when(now, now), "today");
        assert_eq!(format_when(now - Duration::hours(3), now), "today");
    }

    #[test]
    fn test_format_when_yesterday_and_days_ago() {
        let now = Utc::now();
        assert_eq!(format_when(now - Duration::days(1), now), "yesterday");
        assert_eq!(format_when(now - Duration::days(6), now), "6 days ago");
    }

    #[test]
    fn test_format_when_future() {
        let now = Utc::now();
        assert_eq!(format_when(now + Duration::days(1), now), "tomorrow");
        assert_eq!(format_when(now + Duration::days(3), now), "in 3 days");
    }

    #[test]
    fn test_hero_fallback_without_featured() {
        let hero = HeroView::from_featured(None);
        assert!(!hero.has_featured);
        assert_eq!(hero.title, "Pick a listing");
        assert_eq!(hero.location, DEFAULT_HERO_LOCATION);
        assert_eq!(hero.images.len(), 1);
    }
}
