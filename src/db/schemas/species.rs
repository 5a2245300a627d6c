//! Species and race reference data
//!
//! Both collections are addressable by `_id` and by unique short `code`;
//! a race names its parent species with the same dual addressing. This is
//! a standing property of the data set, not an anomaly, and the resolver
//! encapsulates the fallback once for every consumer.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

pub const SPECIES_COLLECTION: &str = "species";
pub const RACE_COLLECTION: &str = "races";

/// Species reference document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SpeciesDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    /// Unique short code, e.g. "dog"
    pub code: String,
}

/// Race reference document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RaceDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    /// Unique short code, e.g. "husky"
    pub code: String,

    /// Parent species: ObjectId hex or species code (dual addressing)
    #[serde(default)]
    pub species: String,
}

fn code_index() -> Vec<(Document, Option<IndexOptions>)> {
    vec![(
        doc! { "code": 1 },
        Some(
            IndexOptions::builder()
                .unique(true)
                .name("code_unique".to_string())
                .build(),
        ),
    )]
}

impl IntoIndexes for SpeciesDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        code_index()
    }
}

impl IntoIndexes for RaceDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        code_index()
    }
}

impl MutMetadata for SpeciesDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

impl MutMetadata for RaceDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
