//! HTTP routes for adoptable animals
//!
//! - `GET    /api/v1/animals`      - list (filters: status, species)
//! - `POST   /api/v1/animals`      - create listing (authenticated)
//! - `GET    /api/v1/animals/{id}` - projected detail
//! - `PATCH  /api/v1/animals/{id}` - owner-only edit
//! - `DELETE /api/v1/animals/{id}` - owner-only soft delete

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::authenticate;
use crate::catalog::RefKind;
use crate::db::schemas::{AnimalDoc, AnimalStatus, Photo};
use crate::error::{FieldError, RefugeError};
use crate::routes::respond::{
    auth_header, error_response, json_response, page_limit, parse_json_body, parse_object_id,
    parse_query_params,
};
use crate::server::AppState;
use crate::validate::{finish, require};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub age_months: i32,
    #[serde(default)]
    pub sex: String,
    /// Species reference: ObjectId hex or species code
    #[serde(default)]
    pub species: String,
    /// Race reference: ObjectId hex or race code
    #[serde(default)]
    pub race: String,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnimalRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub age_months: Option<i32>,
    pub sex: Option<String>,
    pub status: Option<String>,
    pub photos: Option<Vec<Photo>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

/// Listing summary; detail payloads with resolved references come from
/// the projector on the single-document route
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalSummary {
    pub id: String,
    pub name: String,
    pub species: String,
    pub race: String,
    pub status: AnimalStatus,
    pub photos: Vec<Photo>,
}

impl AnimalSummary {
    fn from_doc(doc: &AnimalDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: doc.name.clone(),
            species: doc.species.clone(),
            race: doc.race.clone(),
            status: doc.status,
            photos: doc.photos.clone(),
        }
    }
}

/// GET /api/v1/animals
pub async fn list(state: Arc<AppState>, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));

    let mut filter = doc! {};
    if let Some(status) = params.get("status") {
        match AnimalStatus::parse(status) {
            Some(status) => {
                filter.insert("status", status.as_str());
            }
            None => {
                return error_response(&RefugeError::invalid(
                    "status",
                    "must be available, in_progress, or adopted",
                ));
            }
        }
    }
    if let Some(species) = params.get("species") {
        filter.insert("species", species.as_str());
    }

    let limit = page_limit(&params, state.args.max_page_size);

    match state.animals.find_many(filter, limit).await {
        Ok(docs) => {
            let summaries: Vec<AnimalSummary> = docs.iter().map(AnimalSummary::from_doc).collect();
            json_response(StatusCode::OK, &summaries)
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/animals/{id}
pub async fn get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let animal = match state.animals.find_by_id(oid).await {
        Ok(Some(animal)) => animal,
        Ok(None) => return error_response(&RefugeError::NotFound(format!("animal {}", id))),
        Err(err) => return error_response(&err),
    };

    match state.projector.animal(&animal).await {
        Ok(payload) => json_response(StatusCode::OK, &payload),
        Err(err) => error_response(&err),
    }
}

/// POST /api/v1/animals
pub async fn create(state: Arc<AppState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    let body: CreateAnimalRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(err) => return error_response(&err),
    };

    let mut errors: Vec<FieldError> = Vec::new();
    require(&mut errors, "name", &body.name);
    require(&mut errors, "species", &body.species);
    if let Err(err) = finish(errors) {
        return error_response(&err);
    }

    // The species reference must resolve at submission time so a listing
    // can always render its required speciesDetails later.
    match state.resolver.resolve(RefKind::SpeciesLike, &body.species).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(&RefugeError::invalid(
                "species",
                format!("unknown species reference '{}'", body.species),
            ));
        }
        Err(err) => return error_response(&err),
    }

    let animal = AnimalDoc {
        _id: None,
        metadata: Default::default(),
        name: body.name,
        description: body.description,
        age_months: body.age_months,
        sex: body.sex,
        species: body.species,
        race: body.race,
        photos: body.photos,
        publisher_id: identity.user_id,
        publisher_kind: identity.user_type,
        status: AnimalStatus::Available,
    };

    match state.animals.insert_one(animal).await {
        Ok(id) => {
            info!(animal = %id.to_hex(), publisher = %identity.user_id.to_hex(), "animal listed");
            json_response(
                StatusCode::CREATED,
                &CreatedResponse { id: id.to_hex() },
            )
        }
        Err(err) => error_response(&err),
    }
}

/// PATCH /api/v1/animals/{id}
pub async fn update(state: Arc<AppState>, req: Request<Incoming>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    let body: UpdateAnimalRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(err) => return error_response(&err),
    };

    let mut set = doc! {};
    if let Some(name) = body.name {
        set.insert("name", name);
    }
    if let Some(description) = body.description {
        set.insert("description", description);
    }
    if let Some(age_months) = body.age_months {
        set.insert("age_months", age_months);
    }
    if let Some(sex) = body.sex {
        set.insert("sex", sex);
    }
    if let Some(status) = body.status {
        match AnimalStatus::parse(&status) {
            Some(status) => {
                set.insert("status", status.as_str());
            }
            None => {
                return error_response(&RefugeError::invalid(
                    "status",
                    "must be available, in_progress, or adopted",
                ));
            }
        }
    }
    if let Some(photos) = body.photos {
        match bson::to_bson(&photos) {
            Ok(photos) => {
                set.insert("photos", photos);
            }
            Err(err) => return error_response(&RefugeError::Http(err.to_string())),
        }
    }

    if set.is_empty() {
        return error_response(&RefugeError::Http("no updatable fields supplied".into()));
    }

    // Ownership re-derived from stored publisher fields, not from any
    // claim in the request body.
    let filter = doc! { "_id": oid, "publisher_id": identity.user_id };
    match state.animals.update_one(filter, doc! { "$set": set }).await {
        Ok(result) if result.matched_count > 0 => {
            json_response(StatusCode::OK, &serde_json::json!({ "updated": true }))
        }
        Ok(_) => owner_mismatch_response(&state, oid, id).await,
        Err(err) => error_response(&err),
    }
}

/// DELETE /api/v1/animals/{id}
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

    let filter = doc! { "_id": oid, "publisher_id": identity.user_id };
    match state.animals.soft_delete(filter).await {
        Ok(result) if result.matched_count > 0 => {
            info!(animal = %id, "animal listing deleted");
            json_response(StatusCode::OK, &serde_json::json!({ "deleted": true }))
        }
        Ok(_) => owner_mismatch_response(&state, oid, id).await,
        Err(err) => error_response(&err),
    }
}

/// Distinguish "animal absent" (404) from "present but not yours" (403)
/// after an ownership-filtered write matched nothing
async fn owner_mismatch_response(
    state: &AppState,
    oid: bson::oid::ObjectId,
    id: &str,
) -> Response<Full<Bytes>> {
    match state.animals.find_by_id(oid).await {
        Ok(Some(_)) => error_response(&RefugeError::Authorization(
            "caller does not own this listing".into(),
        )),
        Ok(None) => error_response(&RefugeError::NotFound(format!("animal {}", id))),
        Err(err) => error_response(&err),
    }
}
