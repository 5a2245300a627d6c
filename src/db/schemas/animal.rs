//! Adoptable animal schema
//!
//! The `species` and `race` fields carry either an ObjectId in hex form or
//! a short reference code. Both forms coexist in the data and the resolver
//! handles the fallback; the document stores the reference verbatim.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{Metadata, OwnerKind};

/// Collection name for animals
pub const ANIMAL_COLLECTION: &str = "animals";

/// Lifecycle status of an adoptable animal
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    #[default]
    Available,
    InProgress,
    Adopted,
}

impl AnimalStatus {
    /// Wire form used in filters and updates
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Available => "available",
            AnimalStatus::InProgress => "in_progress",
            AnimalStatus::Adopted => "adopted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(AnimalStatus::Available),
            "in_progress" => Some(AnimalStatus::InProgress),
            "adopted" => Some(AnimalStatus::Adopted),
            _ => None,
        }
    }
}

/// An uploaded photo: the binary lives in external storage, only the
/// stable URL and the storage handle are kept
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    #[serde(default)]
    pub storage_id: String,
}

/// Adoptable animal document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AnimalDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub age_months: i32,

    #[serde(default)]
    pub sex: String,

    /// Species reference: ObjectId hex or species code (dual addressing)
    pub species: String,

    /// Race reference: ObjectId hex or race code (dual addressing)
    #[serde(default)]
    pub race: String,

    #[serde(default)]
    pub photos: Vec<Photo>,

    /// Account that published this listing
    pub publisher_id: ObjectId,
    pub publisher_kind: OwnerKind,

    #[serde(default)]
    pub status: AnimalStatus,
}

impl IntoIndexes for AnimalDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "publisher_id": 1, "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("publisher_status_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("status_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "species": 1 },
                Some(
                    IndexOptions::builder()
                        .name("species_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for AnimalDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AnimalStatus::Available,
            AnimalStatus::InProgress,
            AnimalStatus::Adopted,
        ] {
            assert_eq!(AnimalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(AnimalStatus::parse("pending"), None);
    }

    #[test]
    fn test_status_serde_wire_form() {
        let json = serde_json::to_string(&AnimalStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
