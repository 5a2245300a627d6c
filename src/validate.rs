//! Submission validation
//!
//! Field-level checks for create endpoints. Every failure names the field
//! it concerns; the route layer returns the full list so a form can mark
//! every offending input at once.

use serde::Deserialize;

use crate::db::schemas::{Photo, ReportType};
use crate::error::{FieldError, RefugeError};

/// Photo count bounds for every report
pub const MIN_REPORT_PHOTOS: usize = 2;
pub const MAX_REPORT_PHOTOS: usize = 3;

/// Report submission payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    #[serde(default)]
    pub report_type: String,

    #[serde(default)]
    pub photos: Vec<Photo>,

    #[serde(default)]
    pub incident_date: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub species: String,

    #[serde(default)]
    pub breed: String,

    #[serde(default)]
    pub contact: String,

    #[serde(default)]
    pub video_url: String,
}

/// Validate a report submission and return its parsed type tag.
///
/// Both report types need an incident date and 2..=3 photos. A
/// disappearance additionally needs species, breed, and an owner contact;
/// an abuse report needs nothing more (video and description stay
/// optional).
pub fn validate_report(submission: &ReportSubmission) -> Result<ReportType, RefugeError> {
    let mut errors = Vec::new();

    let report_type = match ReportType::parse(&submission.report_type) {
        Some(tag) => Some(tag),
        None => {
            errors.push(FieldError::new(
                "reportType",
                "must be 'disparition' or 'maltraitance'",
            ));
            None
        }
    };

    let photo_count = submission.photos.len();
    if !(MIN_REPORT_PHOTOS..=MAX_REPORT_PHOTOS).contains(&photo_count) {
        errors.push(FieldError::new(
            "photos",
            format!(
                "between {} and {} photos required, got {}",
                MIN_REPORT_PHOTOS, MAX_REPORT_PHOTOS, photo_count
            ),
        ));
    }

    require(&mut errors, "incidentDate", &submission.incident_date);

    if report_type == Some(ReportType::Disparition) {
        require(&mut errors, "species", &submission.species);
        require(&mut errors, "breed", &submission.breed);
        require(&mut errors, "contact", &submission.contact);
    }

    match (errors.is_empty(), report_type) {
        (true, Some(tag)) => Ok(tag),
        _ => Err(RefugeError::Validation(errors)),
    }
}

/// Push a field error when a required value is empty
pub fn require(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "required"));
    }
}

/// Finish a validation pass: empty error list means success
pub fn finish(errors: Vec<FieldError>) -> Result<(), RefugeError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RefugeError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> Vec<Photo> {
        (0..n)
            .map(|i| Photo {
                url: format!("https://cdn.example/p{}.jpg", i),
                storage_id: format!("p{}", i),
            })
            .collect()
    }

    fn disparition() -> ReportSubmission {
        ReportSubmission {
            report_type: "disparition".to_string(),
            photos: photos(2),
            incident_date: "2024-05-12T09:00:00Z".to_string(),
            description: String::new(),
            location: "Lille".to_string(),
            species: "dog".to_string(),
            breed: "husky".to_string(),
            contact: "owner@example.org".to_string(),
            video_url: String::new(),
        }
    }

    #[test]
    fn test_valid_disparition_passes() {
        assert_eq!(validate_report(&disparition()).unwrap(), ReportType::Disparition);
    }

    #[test]
    fn test_photo_count_bounds() {
        for (count, ok) in [(1usize, false), (2, true), (3, true), (4, false)] {
            let mut submission = disparition();
            submission.photos = photos(count);
            let result = validate_report(&submission);
            assert_eq!(result.is_ok(), ok, "photo count {}", count);
            if !ok {
                let err = result.unwrap_err();
                let fields = err.fields().unwrap();
                assert!(fields.iter().any(|f| f.field == "photos"));
            }
        }
    }

    #[test]
    fn test_disparition_missing_contact_names_contact() {
        let mut submission = disparition();
        submission.contact = String::new();
        let err = validate_report(&submission).unwrap_err();
        let fields = err.fields().unwrap();
        assert!(fields.iter().any(|f| f.field == "contact"));
    }

    #[test]
    fn test_maltraitance_needs_no_contact() {
        let mut submission = disparition();
        submission.report_type = "maltraitance".to_string();
        submission.contact = String::new();
        submission.species = String::new();
        submission.breed = String::new();
        assert_eq!(validate_report(&submission).unwrap(), ReportType::Maltraitance);
    }

    #[test]
    fn test_maltraitance_still_needs_incident_date() {
        let mut submission = disparition();
        submission.report_type = "maltraitance".to_string();
        submission.incident_date = String::new();
        let err = validate_report(&submission).unwrap_err();
        let fields = err.fields().unwrap();
        assert!(fields.iter().any(|f| f.field == "incidentDate"));
    }

    #[test]
    fn test_unknown_report_type_rejected() {
        let mut submission = disparition();
        submission.report_type = "autre".to_string();
        let err = validate_report(&submission).unwrap_err();
        assert!(err.fields().unwrap().iter().any(|f| f.field == "reportType"));
    }

    #[test]
    fn test_all_failures_reported_at_once() {
        let submission = ReportSubmission {
            report_type: "disparition".to_string(),
            photos: photos(1),
            incident_date: String::new(),
            description: String::new(),
            location: String::new(),
            species: String::new(),
            breed: String::new(),
            contact: String::new(),
            video_url: String::new(),
        };
        let err = validate_report(&submission).unwrap_err();
        let fields: Vec<_> = err.fields().unwrap().iter().map(|f| f.field.as_str()).collect();
        for expected in ["photos", "incidentDate", "species", "breed", "contact"] {
            assert!(fields.contains(&expected), "missing {}", expected);
        }
    }
}
