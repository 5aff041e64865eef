//! Listing route handlers: creation form, create, and admin actions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use caravanhub_core::{ListingId, Standard};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::services::listings::{self, ImageUpload, MAX_IMAGES, NewListing};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// New listing form template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/new.html")]
pub struct NewListingTemplate {
    pub error: Option<String>,
    pub max_images: usize,
}

// =============================================================================
// Creation
// =============================================================================

/// Display the new-listing form.
pub async fn new_page(RequireAuth(_user): RequireAuth) -> impl IntoResponse {
    NewListingTemplate {
        error: None,
        max_images: MAX_IMAGES,
    }
}

/// Handle new-listing form submission (multipart: fields plus image files).
///
/// Validation failures and upload errors re-render the form with a message;
/// nothing is inserted unless every upload succeeded.
#[instrument(skip(state, user, multipart))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Response {
    let listing = match read_listing_form(multipart).await {
        Ok(listing) => listing,
        Err(e) => return form_error(&e),
    };

    match listings::create(&state, &user, listing).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => form_error(&e),
    }
}

/// Re-render the form with the failure surfaced inline.
fn form_error(error: &AppError) -> Response {
    let message = match error {
        AppError::BadRequest(msg) => msg.clone(),
        _ => "Failed to save listing, please try again.".to_string(),
    };
    NewListingTemplate {
        error: Some(message),
        max_images: MAX_IMAGES,
    }
    .into_response()
}

/// Collect the multipart form into a [`NewListing`].
///
/// Image parts beyond [`MAX_IMAGES`] are ignored, matching the file-picker
/// limit in the form.
async fn read_listing_form(mut multipart: Multipart) -> Result<NewListing, AppError> {
    let mut title = String::new();
    let mut standard = Standard::default();
    let mut location = String::new();
    let mut contact_name = String::new();
    let mut contact_email = String::new();
    let mut contact_phone = String::new();
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid form data: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == "images" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("failed to read image: {e}")))?;
            // An empty file input still submits one nameless empty part.
            if !bytes.is_empty() && images.len() < MAX_IMAGES {
                images.push(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid form data: {e}")))?;
        match name.as_str() {
            "title" => title = value,
            "standard" => standard = value.parse().unwrap_or_default(),
            "location" => location = value,
            "contact_name" => contact_name = value,
            "contact_email" => contact_email = value,
            "contact_phone" => contact_phone = value,
            _ => {}
        }
    }

    Ok(NewListing {
        title,
        standard,
        location,
        contact_name,
        contact_email,
        contact_phone: if contact_phone.trim().is_empty() {
            None
        } else {
            Some(contact_phone)
        },
        images,
    })
}

// =============================================================================
// Admin Actions
// =============================================================================

/// Promote a listing to the featured slot.
pub async fn feature(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ListingId>,
) -> Result<Redirect, AppError> {
    listings::set_featured(&state, &user, id).await?;
    Ok(Redirect::to("/"))
}

/// Delete a listing and its stored images.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<ListingId>,
) -> Result<Redirect, AppError> {
    listings::delete(&state, &user, id).await?;
    Ok(Redirect::to("/"))
}
