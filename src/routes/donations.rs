//! HTTP routes for donation listings
//!
//! - `GET    /api/v1/donations`      - list (filters: category, city)
//! - `POST   /api/v1/donations`      - create listing (authenticated)
//! - `GET    /api/v1/donations/{id}` - projected detail (author resolved)
//! - `DELETE /api/v1/donations/{id}` - author-only soft delete

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::authenticate;
use crate::db::schemas::{DonationDoc, Photo};
use crate::error::{FieldError, RefugeError};
use crate::routes::respond::{
    auth_header, error_response, json_response, page_limit, parse_json_body, parse_object_id,
    parse_query_params,
};
use crate::server::AppState;
use crate::validate::{finish, require};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    pub city: String,
    pub photos: Vec<Photo>,
}

impl DonationSummary {
    fn from_doc(doc: &DonationDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: doc.title.clone(),
            category: doc.category.clone(),
            city: doc.city.clone(),
            photos: doc.photos.clone(),
        }
    }
}

/// GET /api/v1/donations
pub async fn list(state: Arc<AppState>, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));

    let mut filter = doc! {};
    if let Some(category) = params.get("category") {
        filter.insert("category", category.as_str());
    }
    if let Some(city) = params.get("city") {
        filter.insert("city", city.as_str());
    }

    let limit = page_limit(&params, state.args.max_page_size);

    match state.donations.find_many(filter, limit).await {
        Ok(docs) => {
            let summaries: Vec<DonationSummary> =
                docs.iter().map(DonationSummary::from_doc).collect();
            json_response(StatusCode::OK, &summaries)
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/donations/{id}
pub async fn get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let donation = match state.donations.find_by_id(oid).await {
        Ok(Some(donation)) => donation,
        Ok(None) => return error_response(&RefugeError::NotFound(format!("donation {}", id))),
        Err(err) => return error_response(&err),
    };

    match state.projector.donation(&donation).await {
        Ok(payload) => json_response(StatusCode::OK, &payload),
        Err(err) => error_response(&err),
    }
}

/// POST /api/v1/donations
pub async fn create(state: Arc<AppState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    let body: CreateDonationRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(err) => return error_response(&err),
    };

    let mut errors: Vec<FieldError> = Vec::new();
    require(&mut errors, "title", &body.title);
    if let Err(err) = finish(errors) {
        return error_response(&err);
    }

    let donation = DonationDoc {
        _id: None,
        metadata: Default::default(),
        title: body.title,
        description: body.description,
        category: body.category,
        city: body.city,
        photos: body.photos,
        author_id: identity.user_id,
    };

    match state.donations.insert_one(donation).await {
        Ok(id) => {
            info!(donation = %id.to_hex(), author = %identity.user_id.to_hex(), "donation listed");
            json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() })
        }
        Err(err) => error_response(&err),
    }
}

/// DELETE /api/v1/donations/{id}
pub async fn delete(state: Arc<AppState>, req: Request<Incoming>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    let filter = doc! { "_id": oid, "author_id": identity.user_id };
    match state.donations.soft_delete(filter).await {
        Ok(result) if result.matched_count > 0 => {
            json_response(StatusCode::OK, &serde_json::json!({ "deleted": true }))
        }
        Ok(_) => match state.donations.find_by_id(oid).await {
            Ok(Some(_)) => error_response(&RefugeError::Authorization(
                "caller does not own this donation".into(),
            )),
            Ok(None) => error_response(&RefugeError::NotFound(format!("donation {}", id))),
            Err(err) => error_response(&err),
        },
        Err(err) => error_response(&err),
    }
}
