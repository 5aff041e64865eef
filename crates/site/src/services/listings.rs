//! Listing mutations: create, delete, set-featured.
//!
//! Every mutation finishes with a full store refresh; the realtime feed will
//! usually deliver a second refresh for the same change, which is harmless
//! because refresh is an idempotent full replace.

use tracing::{instrument, warn};
use uuid::Uuid;

use caravanhub_core::{Email, ListingId, Standard};

use crate::error::{AppError, Result};
use crate::models::{CurrentUser, NewListingRow};
use crate::state::AppState;
use crate::supabase::{bucket_object_key, object_key_from_url};

/// Maximum number of images accepted per listing.
pub const MAX_IMAGES: usize = 10;

/// A validated new-listing submission.
#[derive(Debug)]
pub struct NewListing {
    pub title: String,
    pub standard: Standard,
    pub location: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub images: Vec<ImageUpload>,
}

/// An image file selected for upload.
#[derive(Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased file extension, defaulting to `jpg`.
    fn extension(&self) -> String {
        self.file_name
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty() && *ext != self.file_name)
            .map_or_else(|| "jpg".to_string(), str::to_lowercase)
    }
}

/// Validate the required fields of a submission.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the first missing or invalid field.
/// Validation happens before any backend call.
pub fn validate(listing: &NewListing) -> Result<()> {
    let required = [
        ("title", &listing.title),
        ("location", &listing.location),
        ("contact name", &listing.contact_name),
        ("contact email", &listing.contact_email),
    ];
    for (label, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{label} is required")));
        }
    }

    Email::parse(listing.contact_email.trim())
        .map_err(|e| AppError::BadRequest(format!("contact email: {e}")))?;

    if listing.images.len() > MAX_IMAGES {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_IMAGES} images per listing"
        )));
    }

    Ok(())
}

/// Create a listing for the signed-in user.
///
/// Images upload sequentially to owner-scoped paths, collecting public URLs
/// in submission order (the first becomes the cover). Any upload failure
/// aborts the whole create before the row insert, so no listing row is left
/// pointing at images that never made it.
///
/// # Errors
///
/// Returns a validation error, an upload error, or the insert error.
#[instrument(skip(state, user, listing), fields(owner = %user.id, title = %listing.title))]
pub async fn create(state: &AppState, user: &CurrentUser, listing: NewListing) -> Result<()> {
    validate(&listing)?;

    let client = state.supabase();
    let token = &user.access_token;

    let mut image_urls = Vec::with_capacity(listing.images.len());
    for image in &listing.images {
        let path = format!("{}/{}.{}", user.id, Uuid::new_v4(), image.extension());
        client
            .upload_object(
                token,
                &path,
                image.bytes.clone(),
                image.content_type.as_deref(),
            )
            .await?;
        image_urls.push(client.public_url(&path));
    }

    let row = NewListingRow {
        title: listing.title.trim().to_string(),
        standard: listing.standard,
        location: listing.location.trim().to_string(),
        contact_name: listing.contact_name.trim().to_string(),
        contact_email: listing.contact_email.trim().to_string(),
        contact_phone: listing
            .contact_phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string),
        images: image_urls,
        owner_email: user.email.clone(),
        owner_id: Some(user.id.to_string()),
    };
    client.insert_listing(token, &row).await?;

    state.store().refresh(client).await;
    Ok(())
}

/// Delete a listing and clean up its stored images.
///
/// Image cleanup is best effort: public URLs are resolved back to
/// listing-images object keys and batch-removed, but a cleanup failure only
/// logs - the row delete is the authoritative action. If the deleted listing
/// was the featured one, the local pointer clears immediately.
///
/// # Errors
///
/// Returns the row-delete error; storage failures do not fail the operation.
#[instrument(skip(state, user), fields(listing_id = %id))]
pub async fn delete(state: &AppState, user: &CurrentUser, id: ListingId) -> Result<()> {
    let client = state.supabase();
    let token = &user.access_token;

    if let Some(target) = state.store().get(id).await {
        let keys: Vec<String> = target
            .images
            .iter()
            .filter_map(|url| object_key_from_url(url))
            .filter_map(bucket_object_key)
            .map(ToString::to_string)
            .collect();
        if !keys.is_empty()
            && let Err(e) = client.remove_objects(token, &keys).await
        {
            warn!(error = %e, "image cleanup failed, deleting row anyway");
        }
    }

    client.delete_listing(token, id).await?;

    state.store().clear_featured_if(id).await;
    state.store().refresh(client).await;
    Ok(())
}

/// Promote a listing to the single featured slot.
///
/// Clears the flag on whichever row currently holds it, then sets it on the
/// target. The two steps are not transactional: a crash or a concurrent
/// caller between them can transiently leave zero or two featured rows. The
/// next `load_featured` or a repeat click settles it, so the race is
/// accepted rather than coordinated away.
///
/// # Errors
///
/// Returns the first failing update.
#[instrument(skip(state, user), fields(listing_id = %id))]
pub async fn set_featured(state: &AppState, user: &CurrentUser, id: ListingId) -> Result<()> {
    let client = state.supabase();
    let token = &user.access_token;

    client.clear_featured(token).await?;
    client.set_featured(token, id).await?;

    state.store().set_featured_id(Some(id)).await;
    state.store().refresh(client).await;
    Ok(())
}
