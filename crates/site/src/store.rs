//! In-memory listing store.
//!
//! Holds the site's view of the `listings` table and the single featured
//! pointer. The store is the only writer of the collection and always
//! replaces it wholesale on refresh: readers observe either the previous
//! full list or the new full list, never a partially applied diff. Refresh
//! is idempotent, so overlapping triggers (a mutation's explicit refresh
//! racing a realtime-event refresh) simply end in the state of whichever
//! response lands last.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error};

use caravanhub_core::{ListingId, StandardFilter};

use crate::models::Listing;
use crate::supabase::SupabaseClient;

/// Shared handle to the in-memory listing collection.
///
/// Cheaply cloneable via `Arc`; cloned into every handler and the realtime
/// subscription task.
#[derive(Clone, Default)]
pub struct ListingStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    listings: RwLock<Vec<Listing>>,
    featured_id: RwLock<Option<ListingId>>,
}

impl ListingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refetch every listing (newest first) and replace the collection.
    ///
    /// Fetch errors are logged and leave the previous collection in place -
    /// a failed refresh must never blank the site.
    pub async fn refresh(&self, client: &SupabaseClient) {
        match client.list_listings().await {
            Ok(rows) => {
                let listings: Vec<Listing> = rows.into_iter().map(Listing::from).collect();
                debug!(count = listings.len(), "listing store refreshed");
                self.replace_all(listings).await;
            }
            Err(e) => error!(error = %e, "listing refresh failed, keeping previous state"),
        }
    }

    /// Refetch the featured pointer.
    ///
    /// "No featured listing" is a valid state, not an error; fetch errors are
    /// logged and leave the previous pointer in place.
    pub async fn load_featured(&self, client: &SupabaseClient) {
        match client.featured_listing_id().await {
            Ok(id) => self.set_featured_id(id).await,
            Err(e) => error!(error = %e, "featured lookup failed, keeping previous pointer"),
        }
    }

    /// Replace the entire collection.
    pub async fn replace_all(&self, listings: Vec<Listing>) {
        *self.inner.listings.write().await = listings;
    }

    /// Set or clear the featured pointer.
    pub async fn set_featured_id(&self, id: Option<ListingId>) {
        *self.inner.featured_id.write().await = id;
    }

    /// Clear the featured pointer if it currently points at `id`.
    ///
    /// Used on delete so the hero empties immediately, before the next full
    /// refresh lands.
    pub async fn clear_featured_if(&self, id: ListingId) {
        let mut featured = self.inner.featured_id.write().await;
        if *featured == Some(id) {
            *featured = None;
        }
    }

    /// Full copy of the current collection, newest first.
    pub async fn snapshot(&self) -> Vec<Listing> {
        self.inner.listings.read().await.clone()
    }

    /// Find a listing by id.
    pub async fn get(&self, id: ListingId) -> Option<Listing> {
        self.inner
            .listings
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
    }

    /// Listings passing the search query and standard filter, in stored
    /// order.
    pub async fn filtered(&self, query: &str, filter: StandardFilter) -> Vec<Listing> {
        self.inner
            .listings
            .read()
            .await
            .iter()
            .filter(|l| listing_matches(l, query, filter))
            .cloned()
            .collect()
    }

    /// The current featured pointer.
    pub async fn featured_id(&self) -> Option<ListingId> {
        *self.inner.featured_id.read().await
    }

    /// The listing the featured pointer refers to, if it is still in the
    /// collection.
    pub async fn featured(&self) -> Option<Listing> {
        let id = (*self.inner.featured_id.read().await)?;
        self.get(id).await
    }
}

/// Whether a listing passes the search query and standard filter.
///
/// The standard must match unless the filter is `All`. A non-empty query
/// (trimmed, case-insensitive) must appear as a substring of the title,
/// location, contact name, or contact email.
#[must_use]
pub fn listing_matches(listing: &Listing, query: &str, filter: StandardFilter) -> bool {
    if !filter.matches(listing.standard) {
        return false;
    }

    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }

    [
        &listing.title,
        &listing.location,
        &listing.contact_name,
        &listing.contact_email,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&q))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use caravanhub_core::Standard;
    use chrono::Utc;

    fn listing(id: u128, title: &str, standard: Standard, location: &str) -> Listing {
        Listing {
            id: ListingId::new(uuid::Uuid::from_u128(id)),
            title: title.to_string(),
            standard,
            location: location.to_string(),
            contact_name: "Sam Carter".to_string(),
            contact_email: "sam@example.com".to_string(),
            contact_phone: None,
            images: Vec::new(),
            created_at: Utc::now(),
            owner_email: "sam@example.com".to_string(),
            owner_id: None,
            is_featured: false,
        }
    }

    #[test]
    fn test_matches_all_filter_with_query() {
        let l = listing(1, "Sea View", Standard::Gold, "Whitby");
        assert!(listing_matches(&l, "sea", StandardFilter::All));
        assert!(listing_matches(&l, "SEA", StandardFilter::All));
        assert!(listing_matches(&l, "whit", StandardFilter::All));
        assert!(listing_matches(&l, "sam@", StandardFilter::All));
        assert!(!listing_matches(&l, "mountain", StandardFilter::All));
    }

    #[test]
    fn test_matches_standard_filter_without_query() {
        let l = listing(1, "Sea View", Standard::Silver, "Whitby");
        assert!(listing_matches(
            &l,
            "",
            StandardFilter::Only(Standard::Silver)
        ));
        assert!(!listing_matches(&l, "", StandardFilter::Only(Standard::Gold)));
    }

    #[test]
    fn test_matches_requires_both() {
        let l = listing(1, "Sea View", Standard::Bronze, "Whitby");
        // Query matches, standard does not.
        assert!(!listing_matches(
            &l,
            "sea",
            StandardFilter::Only(Standard::Gold)
        ));
    }

    #[test]
    fn test_query_is_trimmed() {
        let l = listing(1, "Sea View", Standard::Bronze, "Whitby");
        assert!(listing_matches(&l, "  sea  ", StandardFilter::All));
        assert!(listing_matches(&l, "   ", StandardFilter::All));
    }

    #[tokio::test]
    async fn test_filtered_views() {
        let store = ListingStore::new();
        store
            .replace_all(vec![
                listing(1, "Sea View", Standard::Gold, "Whitby"),
                listing(2, "Forest Hideaway", Standard::Bronze, "Keswick"),
                listing(3, "Golden Sands", Standard::Gold, "Filey"),
            ])
            .await;

        // filtered(q, All) returns every match of q
        let sea = store.filtered("sea", StandardFilter::All).await;
        assert_eq!(sea.len(), 1);
        assert_eq!(sea.first().unwrap().title, "Sea View");

        // filtered("", s) returns exactly the standard-s listings
        let gold = store
            .filtered("", StandardFilter::Only(Standard::Gold))
            .await;
        assert_eq!(gold.len(), 2);
        assert!(gold.iter().all(|l| l.standard == Standard::Gold));
    }

    #[tokio::test]
    async fn test_replace_is_wholesale() {
        let store = ListingStore::new();
        store
            .replace_all(vec![listing(1, "Old", Standard::Bronze, "A")])
            .await;
        store
            .replace_all(vec![
                listing(2, "New One", Standard::Silver, "B"),
                listing(3, "New Two", Standard::Gold, "C"),
            ])
            .await;

        let all = store.snapshot().await;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|l| l.title.starts_with("New")));
    }

    #[tokio::test]
    async fn test_featured_derivation() {
        let store = ListingStore::new();
        let a = listing(1, "A", Standard::Bronze, "X");
        let a_id = a.id;
        store.replace_all(vec![a]).await;

        assert!(store.featured().await.is_none());

        store.set_featured_id(Some(a_id)).await;
        assert_eq!(store.featured().await.unwrap().id, a_id);

        // Pointer at a listing no longer in the collection derives to none.
        store.replace_all(Vec::new()).await;
        assert!(store.featured().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_featured_if() {
        let store = ListingStore::new();
        let a = listing(1, "A", Standard::Bronze, "X");
        let b = listing(2, "B", Standard::Bronze, "X");
        let (a_id, b_id) = (a.id, b.id);
        store.replace_all(vec![a, b]).await;
        store.set_featured_id(Some(a_id)).await;

        // Deleting an unrelated listing leaves the pointer alone.
        store.clear_featured_if(b_id).await;
        assert_eq!(store.featured_id().await, Some(a_id));

        // Deleting the featured listing clears it immediately, before any
        // refresh runs.
        store.clear_featured_if(a_id).await;
        assert!(store.featured_id().await.is_none());
        assert!(store.featured().await.is_none());
    }
}
