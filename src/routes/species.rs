//! HTTP routes for species and race reference data
//!
//! - `GET /api/v1/species`            - list species
//! - `GET /api/v1/species/{idOrCode}` - lookup by id or code (resolver fallback)
//! - `GET /api/v1/races`              - list races (filter: species)
//! - `GET /api/v1/races/{idOrCode}`   - lookup by id or code

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::RefKind;
use crate::db::schemas::{RaceDoc, SpeciesDoc};
use crate::error::RefugeError;
use crate::normalize::normalize;
use crate::routes::respond::{error_response, json_response, page_limit, parse_query_params};
use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesView {
    pub id: String,
    pub name: String,
    pub code: String,
}

impl SpeciesView {
    fn from_doc(doc: &SpeciesDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: doc.name.clone(),
            code: doc.code.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceView {
    pub id: String,
    pub name: String,
    pub code: String,
    pub species: String,
}

impl RaceView {
    fn from_doc(doc: &RaceDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: doc.name.clone(),
            code: doc.code.clone(),
            species: doc.species.clone(),
        }
    }
}

/// GET /api/v1/species
pub async fn list_species(state: Arc<AppState>, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));
    let limit = page_limit(&params, state.args.max_page_size);

    match state.species.find_many(doc! {}, limit).await {
        Ok(docs) => {
            let views: Vec<SpeciesView> = docs.iter().map(SpeciesView::from_doc).collect();
            json_response(StatusCode::OK, &views)
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/species/{idOrCode}
///
/// Dual addressing goes through the resolver so the id/code fallback
/// lives in exactly one place.
pub async fn get_species(state: Arc<AppState>, reference: &str) -> Response<Full<Bytes>> {
    lookup(state, RefKind::SpeciesLike, reference, "species").await
}

/// GET /api/v1/races
pub async fn list_races(state: Arc<AppState>, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));

    let mut filter = doc! {};
    if let Some(species) = params.get("species") {
        filter.insert("species", species.as_str());
    }

    let limit = page_limit(&params, state.args.max_page_size);

    match state.races.find_many(filter, limit).await {
        Ok(docs) => {
            let views: Vec<RaceView> = docs.iter().map(RaceView::from_doc).collect();
            json_response(StatusCode::OK, &views)
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/races/{idOrCode}
pub async fn get_race(state: Arc<AppState>, reference: &str) -> Response<Full<Bytes>> {
    lookup(state, RefKind::RaceLike, reference, "race").await
}

async fn lookup(
    state: Arc<AppState>,
    kind: RefKind,
    reference: &str,
    what: &str,
) -> Response<Full<Bytes>> {
    match state.resolver.resolve(kind, reference).await {
        Ok(Some(resolution)) => {
            let shaped = normalize(kind, resolution.source_collection, &resolution.record);
            json_response(StatusCode::OK, &shaped)
        }
        Ok(None) => error_response(&RefugeError::NotFound(format!("{} {}", what, reference))),
        Err(err) => error_response(&err),
    }
}
