//! Adoption request schema
//!
//! A request links a requester, the animal's owner, and the animal.
//! Status transitions are guarded by the state machine in
//! `crate::adoption`; the document itself only records the state.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for adoption requests
pub const ADOPTION_REQUEST_COLLECTION: &str = "adoption_requests";

/// Adoption request status; `pending` is the only non-terminal state
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdoptionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl AdoptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionStatus::Pending => "pending",
            AdoptionStatus::Accepted => "accepted",
            AdoptionStatus::Rejected => "rejected",
        }
    }
}

/// Adoption request document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AdoptionRequestDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Account asking to adopt
    pub requester_id: ObjectId,

    /// Account that published the animal; only this account may decide
    pub owner_id: ObjectId,

    /// The animal being requested
    pub animal_id: ObjectId,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub status: AdoptionStatus,
}

impl IntoIndexes for AdoptionRequestDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "owner_id": 1, "status": 1 },
                Some(
                    IndexOptions::builder()
                        .name("owner_status_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "animal_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("animal_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for AdoptionRequestDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
