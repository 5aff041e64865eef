//! Listing domain and row types.
//!
//! `ListingRow` mirrors the backend's `listings` table columns; `Listing` is
//! the domain type the rest of the site works with. Listings are immutable
//! after creation apart from the `is_featured` flag - there is no edit
//! operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caravanhub_core::{ListingId, Standard};

/// A caravan listing (domain type).
#[derive(Debug, Clone)]
pub struct Listing {
    /// Backend-assigned unique id.
    pub id: ListingId,
    /// Listing title.
    pub title: String,
    /// Quality tier.
    pub standard: Standard,
    /// Free-text location (town / park / county).
    pub location: String,
    /// Contact name shown to visitors.
    pub contact_name: String,
    /// Contact email shown to visitors.
    pub contact_email: String,
    /// Optional contact phone.
    pub contact_phone: Option<String>,
    /// Public image URLs in display order; the first is the cover image.
    pub images: Vec<String>,
    /// When the listing was created.
    pub created_at: DateTime<Utc>,
    /// Email of the owning account, stamped at creation.
    pub owner_email: String,
    /// Auth identity of the owning account, when known.
    pub owner_id: Option<String>,
    /// Whether this is the promoted hero listing. At most one listing in the
    /// collection holds this at rest.
    pub is_featured: bool,
}

/// Row shape returned by the backend for the `listings` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingRow {
    pub id: ListingId,
    pub title: String,
    pub standard: Standard,
    pub location: String,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub owner_email: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            standard: row.standard,
            location: row.location,
            contact_name: row.contact_name,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            // null images column reads as an empty sequence
            images: row.images.unwrap_or_default(),
            created_at: row.created_at,
            owner_email: row.owner_email,
            owner_id: row.owner_id,
            is_featured: row.is_featured,
        }
    }
}

/// Insert payload for a new listing row.
///
/// `id`, `created_at`, and `is_featured` are backend-assigned/defaulted.
#[derive(Debug, Clone, Serialize)]
pub struct NewListingRow {
    pub title: String,
    pub standard: Standard,
    pub location: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub images: Vec<String>,
    pub owner_email: String,
    pub owner_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_row_json(images: &str) -> String {
        format!(
            r#"{{
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "title": "Family Caravan by the Sea",
                "standard": "Gold",
                "location": "Whitby, North Yorkshire",
                "contact_name": "Sam Carter",
                "contact_email": "sam@example.com",
                "contact_phone": null,
                "images": {images},
                "created_at": "2026-05-04T12:30:00Z",
                "owner_email": "sam@example.com",
                "owner_id": "8b7c3f1e-0000-4000-8000-000000000001",
                "is_featured": false
            }}"#
        )
    }

    #[test]
    fn test_row_deserializes_and_converts() {
        let row: ListingRow =
            serde_json::from_str(&sample_row_json(r#"["https://cdn/one.jpg"]"#)).unwrap();
        let listing = Listing::from(row);
        assert_eq!(listing.title, "Family Caravan by the Sea");
        assert_eq!(listing.standard, Standard::Gold);
        assert_eq!(listing.images, vec!["https://cdn/one.jpg".to_string()]);
        assert!(!listing.is_featured);
    }

    #[test]
    fn test_null_images_become_empty() {
        let row: ListingRow = serde_json::from_str(&sample_row_json("null")).unwrap();
        let listing = Listing::from(row);
        assert!(listing.images.is_empty());
    }

    #[test]
    fn test_missing_optional_columns_default() {
        // A projection without the nullable columns still deserializes.
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "title": "T",
            "standard": "Bronze",
            "location": "L",
            "contact_name": "C",
            "contact_email": "c@example.com",
            "created_at": "2026-05-04T12:30:00Z",
            "owner_email": "o@example.com"
        }"#;
        let row: ListingRow = serde_json::from_str(json).unwrap();
        assert!(row.contact_phone.is_none());
        assert!(row.owner_id.is_none());
        assert!(!row.is_featured);
    }
}
