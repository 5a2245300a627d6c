//! Shelter / service directory schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{Metadata, Photo};

/// Collection name for shelters
pub const SHELTER_COLLECTION: &str = "shelters";

/// Shelter directory document, author polymorphic like donations
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ShelterDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub capacity: i32,

    #[serde(default)]
    pub photos: Vec<Photo>,

    /// Polymorphic author reference across the four owner collections
    pub author_id: ObjectId,
}

impl IntoIndexes for ShelterDoc {
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

impl MutMetadata for ShelterDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
