//! Field Fallback Normalizer
//!
//! Shapes a resolved record into the stable output form for its reference
//! kind. The per-(kind, collection) mapping tables below are the single
//! place where field-name drift between the owner collections is absorbed.
//!
//! Projection is an allow-list: only enumerated fields are copied, so
//! credentials (`password_hash`) and any future additions to the source
//! records can never leak into a payload. Missing fields default to the
//! empty string.

use bson::Document;
use serde_json::{json, Map, Value};

use crate::catalog::RefKind;
use crate::db::schemas::{
    ASSOCIATION_COLLECTION, RACE_COLLECTION, SPECIES_COLLECTION, STORE_COLLECTION,
    USER_COLLECTION, VETERINARIAN_COLLECTION,
};

/// (source field, output field) pairs per collection. Exhaustive by
/// construction: adding an output field means adding it here.
const USER_FIELDS: &[(&str, &str)] = &[
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("email", "email"),
    ("phone", "phone"),
    ("city", "city"),
];

const VETERINARIAN_FIELDS: &[(&str, &str)] = &[
    ("clinic", "clinicName"),
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("email", "email"),
    ("phone", "phone"),
    ("city", "city"),
];

const ASSOCIATION_FIELDS: &[(&str, &str)] = &[
    ("name", "associationName"),
    ("email", "email"),
    ("phone", "phone"),
    ("city", "city"),
];

const STORE_FIELDS: &[(&str, &str)] = &[
    ("shop_name", "storeName"),
    ("email", "email"),
    ("phone", "phone"),
    ("city", "city"),
];

const SPECIES_FIELDS: &[(&str, &str)] = &[("name", "name"), ("code", "code")];

const RACE_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("code", "code"),
    ("species", "species"),
];

/// Mapping table for a (kind, collection) pair
fn mapping_for(kind: RefKind, collection: &str) -> &'static [(&'static str, &'static str)] {
    match (kind, collection) {
        (RefKind::SpeciesLike, SPECIES_COLLECTION) => SPECIES_FIELDS,
        (RefKind::RaceLike, RACE_COLLECTION) => RACE_FIELDS,
        (_, USER_COLLECTION) => USER_FIELDS,
        (_, VETERINARIAN_COLLECTION) => VETERINARIAN_FIELDS,
        (_, ASSOCIATION_COLLECTION) => ASSOCIATION_FIELDS,
        (_, STORE_COLLECTION) => STORE_FIELDS,
        // A collection outside the catalog cannot reach here through the
        // resolver; shape nothing rather than guess.
        _ => &[],
    }
}

/// The `authorKind` value derived from the source collection, for
/// author-like kinds only
fn author_kind_for(collection: &str) -> Option<&'static str> {
    match collection {
        USER_COLLECTION => Some("user"),
        VETERINARIAN_COLLECTION => Some("veterinarian"),
        ASSOCIATION_COLLECTION => Some("association"),
        STORE_COLLECTION => Some("store"),
        _ => None,
    }
}

/// Shape a resolved record into its stable output form.
///
/// Never fails: unknown fields are dropped, missing fields become `""`.
pub fn normalize(kind: RefKind, source_collection: &str, record: &Document) -> Value {
    let mut shaped = Map::new();

    for (source, output) in mapping_for(kind, source_collection) {
        let value = record.get_str(source).unwrap_or("");
        shaped.insert((*output).to_string(), json!(value));
    }

    if matches!(kind, RefKind::AuthorLike | RefKind::ArticleAuthor) {
        if let Some(author_kind) = author_kind_for(source_collection) {
            shaped.insert("authorKind".to_string(), json!(author_kind));
        }
    }

    Value::Object(shaped)
}

/// The empty shape used when an optional reference fails to resolve
pub fn empty_shape() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_veterinarian_clinic_maps_to_clinic_name() {
        let record = doc! {
            "clinic": "Clinique des Lilas",
            "first_name": "Ana",
            "last_name": "Moreau",
            "email": "ana@lilas.example",
            "password_hash": "$argon2id$...",
        };
        let shaped = normalize(RefKind::AuthorLike, "veterinarians", &record);
        assert_eq!(shaped["clinicName"], "Clinique des Lilas");
        assert_eq!(shaped["firstName"], "Ana");
        assert_eq!(shaped["authorKind"], "veterinarian");
    }

    #[test]
    fn test_association_name_maps_to_association_name() {
        let record = doc! { "name": "SPA Nord", "email": "contact@spa.example" };
        let shaped = normalize(RefKind::ArticleAuthor, "associations", &record);
        assert_eq!(shaped["associationName"], "SPA Nord");
        assert_eq!(shaped["authorKind"], "association");
    }

    #[test]
    fn test_store_shop_name_maps_to_store_name() {
        let record = doc! { "shop_name": "Animalerie du Port" };
        let shaped = normalize(RefKind::AuthorLike, "stores", &record);
        assert_eq!(shaped["storeName"], "Animalerie du Port");
        assert_eq!(shaped["authorKind"], "store");
    }

    #[test]
    fn test_secrets_never_forwarded() {
        let record = doc! {
            "email": "user@example.org",
            "password_hash": "$argon2id$v=19$...",
            "session_token": "abc123",
        };
        let shaped = normalize(RefKind::AuthorLike, "users", &record);
        let text = shaped.to_string();
        assert!(!text.contains("argon2"));
        assert!(!text.contains("abc123"));
        assert!(shaped.get("password_hash").is_none());
        assert!(shaped.get("sessionToken").is_none());
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let record = doc! { "email": "user@example.org" };
        let shaped = normalize(RefKind::AuthorLike, "users", &record);
        assert_eq!(shaped["firstName"], "");
        assert_eq!(shaped["phone"], "");
    }

    #[test]
    fn test_species_shape() {
        let record = doc! { "name": "Dog", "code": "dog" };
        let shaped = normalize(RefKind::SpeciesLike, "species", &record);
        assert_eq!(shaped["name"], "Dog");
        assert_eq!(shaped["code"], "dog");
        assert!(shaped.get("authorKind").is_none());
    }

    #[test]
    fn test_race_shape_keeps_parent_species_reference() {
        let record = doc! { "name": "Husky", "code": "husky", "species": "dog" };
        let shaped = normalize(RefKind::RaceLike, "races", &record);
        assert_eq!(shaped["species"], "dog");
    }
}
