//! Article schema
//!
//! Articles are authored by veterinarians or associations only. The author
//! display fields are computed at read time by the projector and never
//! stored on the document.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{Metadata, Photo};

/// Collection name for articles
pub const ARTICLE_COLLECTION: &str = "articles";

/// Article document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ArticleDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title: String,
    pub body: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub photos: Vec<Photo>,

    /// Polymorphic author reference over {veterinarians, associations}
    pub author_id: ObjectId,
}

impl IntoIndexes for ArticleDoc {
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

impl MutMetadata for ArticleDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
