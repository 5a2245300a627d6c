//! HTTP routes for articles
//!
//! - `GET  /api/v1/articles`      - list
//! - `POST /api/v1/articles`      - create (veterinarians and associations only)
//! - `GET  /api/v1/articles/{id}` - projected detail with denormalized author

use bson::doc;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::authenticate;
use crate::db::schemas::{ArticleDoc, OwnerKind, Photo};
use crate::error::{FieldError, RefugeError};
use crate::routes::respond::{
    auth_header, error_response, json_response, page_limit, parse_json_body, parse_object_id,
    parse_query_params,
};
use crate::server::AppState;
use crate::validate::{finish, require};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub summary: String,
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
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub summary: String,
}

impl ArticleSummary {
    fn from_doc(doc: &ArticleDoc) -> Self {
        Self {
            id: doc._id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: doc.title.clone(),
            summary: doc.summary.clone(),
        }
    }
}

/// GET /api/v1/articles
pub async fn list(state: Arc<AppState>, query: Option<&str>) -> Response<Full<Bytes>> {
    let params = parse_query_params(query.unwrap_or(""));
    let limit = page_limit(&params, state.args.max_page_size);

    match state.articles.find_many(doc! {}, limit).await {
        Ok(docs) => {
            let summaries: Vec<ArticleSummary> =
                docs.iter().map(ArticleSummary::from_doc).collect();
            json_response(StatusCode::OK, &summaries)
        }
        Err(err) => error_response(&err),
    }
}

/// GET /api/v1/articles/{id}
pub async fn get(state: Arc<AppState>, id: &str) -> Response<Full<Bytes>> {
    let oid = match parse_object_id(id) {
        Ok(oid) => oid,
        Err(err) => return error_response(&err),
    };

    let article = match state.articles.find_by_id(oid).await {
        Ok(Some(article)) => article,
        Ok(None) => return error_response(&RefugeError::NotFound(format!("article {}", id))),
        Err(err) => return error_response(&err),
    };

    match state.projector.article(&article).await {
        Ok(payload) => json_response(StatusCode::OK, &payload),
        Err(err) => error_response(&err),
    }
}

/// POST /api/v1/articles
///
/// Only professional accounts publish articles; a plain user or store
/// caller is refused before the body is validated.
pub async fn create(state: Arc<AppState>, req: Request<Incoming>) -> Response<Full<Bytes>> {
    let header = auth_header(&req);
    let identity = match authenticate(header.as_deref(), &state.args.jwt_secret()) {
        Ok(identity) => identity,
        Err(err) => return error_response(&err),
    };

    if !matches!(
        identity.user_type,
        OwnerKind::Veterinarian | OwnerKind::Association
    ) {
        return error_response(&RefugeError::Authorization(
            "only veterinarians and associations may publish articles".into(),
        ));
    }

    let body: CreateArticleRequest = match parse_json_body(req).await {
        Ok(body) => body,
        Err(err) => return error_response(&err),
    };

    let mut errors: Vec<FieldError> = Vec::new();
    require(&mut errors, "title", &body.title);
    require(&mut errors, "body", &body.body);
    if let Err(err) = finish(errors) {
        return error_response(&err);
    }

    let article = ArticleDoc {
        _id: None,
        metadata: Default::default(),
        title: body.title,
        body: body.body,
        summary: body.summary,
        photos: body.photos,
        author_id: identity.user_id,
    };

    match state.articles.insert_one(article).await {
        Ok(id) => {
            info!(article = %id.to_hex(), author = %identity.user_id.to_hex(), "article published");
            json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() })
        }
        Err(err) => error_response(&err),
    }
}
