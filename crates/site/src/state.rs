//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::store::ListingStore;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client, the in-memory listing store, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    supabase: SupabaseClient,
    store: ListingStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be constructed from the
    /// configuration.
    pub fn new(config: SiteConfig) -> Result<Self, SupabaseError> {
        let supabase = SupabaseClient::new(&config.supabase)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                supabase,
                store: ListingStore::new(),
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the hosted backend client.
    #[must_use]
    pub fn supabase(&self) -> &SupabaseClient {
        &self.inner.supabase
    }

    /// Get a reference to the in-memory listing store.
    #[must_use]
    pub fn store(&self) -> &ListingStore {
        &self.inner.store
    }
}
