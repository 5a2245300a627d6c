//! HTTP routes for the shelter and service directory
//!
//! - `GET    /api/v1/shelters`      - list (filter: city)
//! - `POST   /api/v1/shelters`      - create entry (authenticated)
//! - `GET    /api/v1/shelters/{id}` - projected detail (author resolved)
//! - `DELETE /api/v1/shelters/{id}` - author-only soft delete

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::authenticate;
use crate::db::schemas::{Photo, ShelterDoc};
use crate::error::{FieldError, RefugeError};
use crate::routes::respond::{
    auth_header, error_response, json_response, page_limit, parse_json_body, parse_object_id,
    parse_query_params,
};
use crate::server::AppState;
use crate::validate::{finish, require};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShelterRequest {
    #[serde(default)]
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
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelterSummary {
    pub id: String,
    pub name: String,
    pub city: String,
    pub capacity: i32,
}

impl ShelterSummary {
    fn from_doc(doc: &ShelterDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: doc.name.clone(),
            city: doc.city.clone(),
            capacity: doc.capacity,
        }
    }
}

/// GET /api/v1/shelters
pub async fn list(state: Arc<AppState>, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));

    let mut filter = doc! {};
    if let Some(city) = params.get("city") {
        filter.insert("city", city.as_str());
    }

    let limit = page_limit(&params, state.args.max_page_size);

    match state.shelters.find_many(filter, limit).await {
        Ok(docs) => {
            let summaries: Vec<ShelterSummary> =
                docs.iter().map(ShelterSummary::from_doc).collect();
            json_response(StatusCode::OK, &summaries)
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/shelters/{id}
pub async fn get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let shelter = match state.shelters.find_by_id(oid).await {
        Ok(Some(shelter)) => shelter,
        Ok(None) => return error_response(&RefugeError::NotFound(format!("shelter {}", id))),
        Err(err) => return error_response(&err),
    };

    match state.projector.shelter(&shelter).await {
        Ok(payload) => json_response(StatusCode::OK, &payload),
        Err(err) => error_response(&err),
    }
}

/// POST /api/v1/shelters
pub async fn create(state: Arc<AppState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    let body: CreateShelterRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(err) => return error_response(&err),
    };

    let mut errors: Vec<FieldError> = Vec::new();
    require(&mut errors, "name", &body.name);
    if let Err(err) = finish(errors) {
        return error_response(&err);
    }

    let shelter = ShelterDoc {
        _id: None,
        metadata: Default::default(),
        name: body.name,
        description: body.description,
        address: body.address,
        city: body.city,
        capacity: body.capacity,
        photos: body.photos,
        author_id: identity.user_id,
    };

    match state.shelters.insert_one(shelter).await {
        Ok(id) => {
            info!(shelter = %id.to_hex(), author = %identity.user_id.to_hex(), "shelter listed");
            json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() })
        }
        Err(err) => error_response(&err),
    }
}

/// DELETE /api/v1/shelters/{id}
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
    match state.shelters.soft_delete(filter).await {
        Ok(result) if result.matched_count > 0 => {
            json_response(StatusCode::OK, &serde_json::json!({ "deleted": true }))
        }
        Ok(_) => match state.shelters.find_by_id(oid).await {
            Ok(Some(_)) => error_response(&RefugeError::Authorization(
                "caller does not own this entry".into(),
            )),
            Ok(None) => error_response(&RefugeError::NotFound(format!("shelter {}", id))),
            Err(err) => error_response(&err),
        },
        Err(err) => error_response(&err),
    }
}
