//! Newtype ids for type-safe entity references.
//!
//! The hosted backend assigns `uuid` primary keys to every row, so ids wrap
//! [`uuid::Uuid`]. Use the `define_id!` macro to create type-safe wrappers
//! that prevent accidentally mixing ids from different entity types.

/// Macro to define a type-safe UUID-backed id wrapper.
///
/// Creates a newtype wrapper around `uuid::Uuid` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_uuid()`
/// - `Display` and `FromStr` delegating to the underlying uuid
///
/// # Example
///
/// ```rust
/// # use caravanhub_core::define_id;
/// define_id!(CampsiteId);
/// define_id!(BookingId);
///
/// let campsite_id = CampsiteId::new(uuid::Uuid::nil());
/// let booking_id = BookingId::new(uuid::Uuid::nil());
///
/// // These are different types, so this won't compile:
/// // let _: CampsiteId = booking_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Create a new id from a `Uuid` value.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Get the underlying `Uuid` value.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity ids
define_id!(ListingId);
define_id!(ProfileId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_from_str_roundtrip() {
        let raw = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let id: ListingId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("not-a-uuid".parse::<ListingId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProfileId::new(uuid::Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");

        let parsed: ProfileId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
