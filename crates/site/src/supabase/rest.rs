//! PostgREST row operations for the `listings` and `profiles` tables.
//!
//! Reads use the anon key (listings are publicly readable); writes carry the
//! acting user's access token so row-level security applies.

use tracing::{debug, instrument};

use caravanhub_core::{ListingId, ProfileId};

use crate::models::{ListingRow, NewListingRow, ProfileRow};

use super::{SupabaseClient, SupabaseError, error_for_response};

/// Column projection for listing reads, matching [`ListingRow`].
const LISTING_COLUMNS: &str = "id,title,standard,location,contact_name,contact_email,\
                               contact_phone,images,created_at,owner_email,owner_id,is_featured";

impl SupabaseClient {
    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url())
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Fetch every listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn list_listings(&self) -> Result<Vec<ListingRow>, SupabaseError> {
        let response = self
            .http()
            .get(self.rest_url("listings"))
            .header("Authorization", self.bearer(None))
            .query(&[
                ("select", LISTING_COLUMNS),
                ("order", "created_at.desc"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let rows: Vec<ListingRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        debug!(count = rows.len(), "fetched listings");
        Ok(rows)
    }

    /// Fetch the id of the listing currently flagged featured, if any.
    ///
    /// At most one row is expected; an empty result is a valid none, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn featured_listing_id(&self) -> Result<Option<ListingId>, SupabaseError> {
        #[derive(serde::Deserialize)]
        struct IdRow {
            id: ListingId,
        }

        let response = self
            .http()
            .get(self.rest_url("listings"))
            .header("Authorization", self.bearer(None))
            .query(&[
                ("select", "id"),
                ("is_featured", "is.true"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let rows: Vec<IdRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        Ok(rows.into_iter().next().map(|r| r.id))
    }

    /// Insert a new listing row.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert is rejected (e.g., by row-level
    /// security) or the request fails.
    #[instrument(skip(self, access_token, row), fields(title = %row.title))]
    pub async fn insert_listing(
        &self,
        access_token: &str,
        row: &NewListingRow,
    ) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .post(self.rest_url("listings"))
            .header("Authorization", self.bearer(Some(access_token)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(())
    }

    /// Clear the featured flag on whichever row currently holds it.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the request fails.
    #[instrument(skip(self, access_token))]
    pub async fn clear_featured(&self, access_token: &str) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .patch(self.rest_url("listings"))
            .header("Authorization", self.bearer(Some(access_token)))
            .header("Prefer", "return=minimal")
            .query(&[("is_featured", "is.true")])
            .json(&serde_json::json!({ "is_featured": false }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(())
    }

    /// Set the featured flag on the given row.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the request fails.
    #[instrument(skip(self, access_token), fields(listing_id = %id))]
    pub async fn set_featured(
        &self,
        access_token: &str,
        id: ListingId,
    ) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .patch(self.rest_url("listings"))
            .header("Authorization", self.bearer(Some(access_token)))
            .header("Prefer", "return=minimal")
            .query(&[("id", format!("eq.{id}"))])
            .json(&serde_json::json!({ "is_featured": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(())
    }

    /// Delete a listing row.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is rejected or the request fails.
    #[instrument(skip(self, access_token), fields(listing_id = %id))]
    pub async fn delete_listing(
        &self,
        access_token: &str,
        id: ListingId,
    ) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .delete(self.rest_url("listings"))
            .header("Authorization", self.bearer(Some(access_token)))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Fetch a profile row by id, or `None` when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, access_token), fields(profile_id = %id))]
    pub async fn get_profile(
        &self,
        access_token: &str,
        id: ProfileId,
    ) -> Result<Option<ProfileRow>, SupabaseError> {
        let response = self
            .http()
            .get(self.rest_url("profiles"))
            .header("Authorization", self.bearer(Some(access_token)))
            .query(&[
                ("select", "id,name,role".to_string()),
                ("id", format!("eq.{id}")),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let rows: Vec<ProfileRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        Ok(rows.into_iter().next())
    }

    /// Upsert a profile row keyed on id.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert is rejected or the request fails.
    #[instrument(skip(self, access_token, row), fields(profile_id = %row.id))]
    pub async fn upsert_profile(
        &self,
        access_token: &str,
        row: &ProfileRow,
    ) -> Result<(), SupabaseError> {
        let response = self
            .http()
            .post(self.rest_url("profiles"))
            .header("Authorization", self.bearer(Some(access_token)))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .query(&[("on_conflict", "id")])
            .json(row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }
        Ok(())
    }
}
