//! Donation listing schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{Metadata, Photo};

/// Collection name for donations
pub const DONATION_COLLECTION: &str = "donations";

/// Donation listing document
///
/// `author_id` is polymorphic: the referenced account may live in any of
/// the four owner collections. The resolver determines which.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DonationDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub photos: Vec<Photo>,

    /// Polymorphic author reference across the four owner collections
    pub author_id: ObjectId,
}

impl IntoIndexes for DonationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "author_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("author_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for DonationDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
