//! HTTP routes for disappearance and abuse reports
//!
//! - `POST /api/v1/reports`      - validated submission
//! - `GET  /api/v1/reports`      - list (filter: reportType)
//! - `GET  /api/v1/reports/{id}` - detail
//!
//! Submissions are at-most-once from the client's perspective: the insert
//! is not retried internally, so a network failure after the write can
//! only be resolved by the caller checking before resubmitting.

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::{ReportDoc, ReportType};
use crate::error::RefugeError;
use crate::routes::respond::{
    error_response, json_response, page_limit, parse_json_body, parse_object_id,
    parse_query_params,
};
use crate::server::AppState;
use crate::validate::{validate_report, ReportSubmission};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

/// Public view of a report; ids rendered as hex, metadata dropped
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub id: String,
    pub report_type: ReportType,
    pub photos: Vec<crate::db::schemas::Photo>,
    pub incident_date: String,
    pub description: String,
    pub location: String,
    pub species: String,
    pub breed: String,
    pub contact: String,
    pub video_url: String,
}

impl ReportView {
    fn from_doc(doc: &ReportDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            report_type: doc.report_type,
            photos: doc.photos.clone(),
            incident_date: doc.incident_date.clone(),
            description: doc.description.clone(),
            location: doc.location.clone(),
            species: doc.species.clone(),
            breed: doc.breed.clone(),
            contact: doc.contact.clone(),
            video_url: doc.video_url.clone(),
        }
    }
}

/// POST /api/v1/reports
pub async fn create(state: Arc<AppState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let submission: ReportSubmission = match parse_json_body(req).await {
        Ok(submission) => submission,
        Err(err) => return error_response(&err),
    };

    let report_type = match validate_report(&submission) {
        Ok(tag) => tag,
        Err(err) => return error_response(&err),
    };

    let report = ReportDoc {
        _id: None,
        metadata: Default::default(),
        report_type,
        photos: submission.photos,
        incident_date: submission.incident_date,
        description: submission.description,
        location: submission.location,
        species: submission.species,
        breed: submission.breed,
        contact: submission.contact,
        video_url: submission.video_url,
    };

    match state.reports.insert_one(report).await {
        Ok(id) => {
            info!(report = %id.to_hex(), report_type = ?report_type, "report filed");
            json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() })
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/reports
pub async fn list(state: Arc<AppState>, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));

    let mut filter = doc! {};
    if let Some(report_type) = params.get("reportType") {
        match ReportType::parse(report_type) {
            Some(_) => {
                filter.insert("report_type", report_type.as_str());
            }
            None => {
                return error_response(&RefugeError::invalid(
                    "reportType",
                    "must be 'disparition' or 'maltraitance'",
                ));
            }
        }
    }

    let limit = page_limit(&params, state.args.max_page_size);

    match state.reports.find_many(filter, limit).await {
        Ok(docs) => {
            let views: Vec<ReportView> = docs.iter().map(ReportView::from_doc).collect();
            json_response(StatusCode::OK, &views)
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/reports/{id}
pub async fn get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    match state.reports.find_by_id(oid).await {
        Ok(Some(report)) => json_response(StatusCode::OK, &ReportView::from_doc(&report)),
        Ok(None) => error_response(&RefugeError::NotFound(format!("report {}", id))),
        Err(err) => error_response(&err),
    }
}
