//! HTTP routes for adoption requests
//!
//! - `POST  /api/v1/adoptions`      - create a pending request (authenticated)
//! - `GET   /api/v1/adoptions/{id}` - detail, visible to requester and owner
//! - `PATCH /api/v1/adoptions/{id}` - owner decision: accept or reject
//!
//! The PATCH transition is delegated to the state machine in
//! `crate::adoption`; responses are 200 on success, 403 for a non-owner,
//! 404 for an unknown request, 409 when the request is no longer pending.

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::adoption::{transition, AdoptionAction};
use crate::auth::authenticate;
use crate::db::schemas::{AdoptionRequestDoc, AdoptionStatus, AnimalStatus};
use crate::error::RefugeError;
use crate::routes::respond::{
    auth_header, error_response, json_response, parse_json_body, parse_object_id,
};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdoptionRequest {
    /// The animal being requested
    #[serde(default)]
    pub animal_id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

/// Public view of an adoption request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionView {
    pub id: String,
    pub requester_id: String,
    pub owner_id: String,
    pub animal_id: String,
    pub message: String,
    pub status: AdoptionStatus,
}

impl AdoptionView {
    fn from_doc(doc: &AdoptionRequestDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            requester_id: doc.requester_id.to_hex(),
            owner_id: doc.owner_id.to_hex(),
            animal_id: doc.animal_id.to_hex(),
            message: doc.message.clone(),
            status: doc.status,
        }
    }
}

/// POST /api/v1/adoptions
pub async fn create(state: Arc<AppState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    let body: CreateAdoptionRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(err) => return error_response(&err),
    };

    let animal_id = match parse_object_id(&body.animal_id) {
        Ok(oid) => oid,
        Err(_) => {
            return error_response(&RefugeError::invalid(
                "animalId",
                "must be a valid document id",
            ));
        }
    };

    // The owner is derived from the stored animal, never from the body.
    let animal = match state.animals.find_by_id(animal_id).await {
        Ok(Some(animal)) => animal,
        Ok(None) => {
            return error_response(&RefugeError::NotFound(format!(
                "animal {}",
                body.animal_id
            )));
        }
        Err(err) => return error_response(&err),
    };

    if animal.status != AnimalStatus::Available {
        return error_response(&RefugeError::Conflict(
            "animal is not available for adoption".into(),
        ));
    }

    if animal.publisher_id == identity.user_id {
        return error_response(&RefugeError::Conflict(
            "cannot request adoption of an animal you published".into(),
        ));
    }

    let request = AdoptionRequestDoc {
        _id: None,
        metadata: Default::default(),
        requester_id: identity.user_id,
        owner_id: animal.publisher_id,
        animal_id,
        message: body.message,
        status: AdoptionStatus::Pending,
    };

    match state.adoption_requests.insert_one(request).await {
        Ok(id) => {
            info!(
                request = %id.to_hex(),
                animal = %animal_id.to_hex(),
                requester = %identity.user_id.to_hex(),
                "adoption requested"
            );
            json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() })
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/adoptions/{id}
pub async fn get(state: Arc<AppState>, req: Request<Incoming>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    match state.adoption_requests.find_by_id(oid).await {
        Ok(Some(request)) => {
            if request.requester_id != identity.user_id && request.owner_id != identity.user_id {
                return error_response(&RefugeError::Authorization(
                    "request is only visible to its requester and owner".into(),
                ));
            }
            json_response(StatusCode::OK, &AdoptionView::from_doc(&request))
        }
        Ok(None) => error_response(&RefugeError::NotFound(format!("adoption request {}", id))),
        Err(err) => error_response(&err),
    }
}

/// PATCH /api/v1/adoptions/{id}
pub async fn decide(state: Arc<AppState>, req: Request<Incoming>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    let body: DecisionRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(err) => return error_response(&err),
    };

    let action = match AdoptionAction::parse(&body.action) {
        Some(action) => action,
        None => {
            return error_response(&RefugeError::invalid(
                "action",
                "must be 'accept' or 'reject'",
            ));
        }
    };

    match transition(
        &state.adoption_requests,
        &state.animals,
        identity.user_id,
        oid,
        action,
    )
    .await
    {
        Ok(request) => json_response(StatusCode::OK, &AdoptionView::from_doc(&request)),
        Err(err) => error_response(&err),
    }
}
