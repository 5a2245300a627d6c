//! Lost-animal and abuse report schema
//!
//! The `report_type` tag discriminates the required-field set: a
//! disappearance needs species, breed, owner contact and an incident date;
//! an abuse report needs only the incident date. Validation lives in
//! `crate::validate`.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{Metadata, Photo};

/// Collection name for reports
pub const REPORT_COLLECTION: &str = "reports";

/// Report discriminator tag (wire values kept from the original data set)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Disappearance (lost animal)
    #[default]
    Disparition,
    /// Abuse
    Maltraitance,
}

impl ReportType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "disparition" => Some(ReportType::Disparition),
            "maltraitance" => Some(ReportType::Maltraitance),
            _ => None,
        }
    }
}

/// Report document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ReportDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub report_type: ReportType,

    /// Between two and three photos, enforced at submission
    pub photos: Vec<Photo>,

    /// Date of the incident, RFC3339; required for both report types
    pub incident_date: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub location: String,

    /// Disappearance only: species reference (id or code)
    #[serde(default)]
    pub species: String,

    /// Disappearance only: breed reference (id or code)
    #[serde(default)]
    pub breed: String,

    /// Disappearance only: how to reach the owner
    #[serde(default)]
    pub contact: String,

    /// Abuse only, optional: URL of an uploaded video
    #[serde(default)]
    pub video_url: String,
}

impl IntoIndexes for ReportDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "report_type": 1 },
            Some(
                IndexOptions::builder()
                    .name("report_type_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for ReportDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_parse() {
        assert_eq!(ReportType::parse("disparition"), Some(ReportType::Disparition));
        assert_eq!(ReportType::parse("maltraitance"), Some(ReportType::Maltraitance));
        assert_eq!(ReportType::parse("other"), None);
    }

    #[test]
    fn test_report_type_wire_form() {
        assert_eq!(
            serde_json::to_string(&ReportType::Disparition).unwrap(),
            "\"disparition\""
        );
    }
}
