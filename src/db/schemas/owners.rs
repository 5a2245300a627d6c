//! Owner-kind account schemas
//!
//! Four collections may own content on the platform: plain users,
//! veterinarians, associations, and stores. They are separate physical
//! collections with drifting field names; the normalizer absorbs the
//! drift at read time. Account creation and password handling live in the
//! external session provider, so these schemas are read-side only here:
//! `password_hash` exists on disk but is never projected.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

pub const USER_COLLECTION: &str = "users";
pub const VETERINARIAN_COLLECTION: &str = "veterinarians";
pub const ASSOCIATION_COLLECTION: &str = "associations";
pub const STORE_COLLECTION: &str = "stores";

/// The kind of account that owns a piece of content
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    #[default]
    User,
    Veterinarian,
    Association,
    Store,
}

impl OwnerKind {
    /// Parse from the wire form used in session claims
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(OwnerKind::User),
            "veterinarian" => Some(OwnerKind::Veterinarian),
            "association" => Some(OwnerKind::Association),
            "store" => Some(OwnerKind::Store),
            _ => None,
        }
    }

    /// Physical collection holding this kind of account
    pub fn collection(&self) -> &'static str {
        match self {
            OwnerKind::User => USER_COLLECTION,
            OwnerKind::Veterinarian => VETERINARIAN_COLLECTION,
            OwnerKind::Association => ASSOCIATION_COLLECTION,
            OwnerKind::Store => STORE_COLLECTION,
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OwnerKind::User => "user",
            OwnerKind::Veterinarian => "veterinarian",
            OwnerKind::Association => "association",
            OwnerKind::Store => "store",
        };
        write!(f, "{}", s)
    }
}

/// Plain user account
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub email: String,
    pub password_hash: String,

    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

/// Veterinarian account; `clinic` is the display name of the practice
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VeterinarianDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub email: String,
    pub password_hash: String,

    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub clinic: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

/// Association account; `name` is the association's registered name
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AssociationDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub email: String,
    pub password_hash: String,

    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

/// Store (pet shop) account; `shop_name` is the storefront name
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StoreDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub email: String,
    pub password_hash: String,

    #[serde(default)]
    pub shop_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

fn email_index() -> Vec<(Document, Option<IndexOptions>)> {
    vec![(
        doc! { "email": 1 },
        Some(
            IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build(),
        ),
    )]
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        email_index()
    }
}

impl IntoIndexes for VeterinarianDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        email_index()
    }
}

impl IntoIndexes for AssociationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        email_index()
    }
}

impl IntoIndexes for StoreDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        email_index()
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for VeterinarianDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for AssociationDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for StoreDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_kind_round_trip() {
        for kind in [
            OwnerKind::User,
            OwnerKind::Veterinarian,
            OwnerKind::Association,
            OwnerKind::Store,
        ] {
            assert_eq!(OwnerKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(OwnerKind::parse("admin"), None);
    }

    #[test]
    fn test_owner_kind_collections_are_distinct() {
        let collections = [
            OwnerKind::User.collection(),
            OwnerKind::Veterinarian.collection(),
            OwnerKind::Association.collection(),
            OwnerKind::Store.collection(),
        ];
        let mut deduped = collections.to_vec();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), collections.len());
    }
}
