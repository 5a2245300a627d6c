//! HTTP server implementation
//!
//! hyper http1 with TokioIo for async handling. All shared dependencies
//! (store client, typed collections, resolver, projector) are constructed
//! once and injected through `AppState`; handlers never reach for globals.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Args;
use crate::db::schemas::{
    AdoptionRequestDoc, AnimalDoc, ArticleDoc, DonationDoc, RaceDoc, ReportDoc, ShelterDoc,
    SpeciesDoc, ADOPTION_REQUEST_COLLECTION, ANIMAL_COLLECTION, ARTICLE_COLLECTION,
    DONATION_COLLECTION, RACE_COLLECTION, REPORT_COLLECTION, SHELTER_COLLECTION,
    SPECIES_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::error::RefugeError;
use crate::projector::Projector;
use crate::resolver::Resolver;
use crate::routes;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub mongo: MongoClient,
    pub animals: MongoCollection<AnimalDoc>,
    pub donations: MongoCollection<DonationDoc>,
    pub shelters: MongoCollection<ShelterDoc>,
    pub articles: MongoCollection<ArticleDoc>,
    pub adoption_requests: MongoCollection<AdoptionRequestDoc>,
    pub reports: MongoCollection<ReportDoc>,
    pub species: MongoCollection<SpeciesDoc>,
    pub races: MongoCollection<RaceDoc>,
    pub resolver: Resolver,
    pub projector: Projector,
    pub started_at: Instant,
}

impl AppState {
    /// Build the full dependency graph from a connected client.
    ///
    /// Typed collections apply their schema indexes here, so index drift
    /// is corrected at startup rather than first use.
    pub async fn new(args: Args, mongo: MongoClient) -> Result<Self, RefugeError> {
        let animals = mongo.collection::<AnimalDoc>(ANIMAL_COLLECTION).await?;
        let donations = mongo.collection::<DonationDoc>(DONATION_COLLECTION).await?;
        let shelters = mongo.collection::<ShelterDoc>(SHELTER_COLLECTION).await?;
        let articles = mongo.collection::<ArticleDoc>(ARTICLE_COLLECTION).await?;
        let adoption_requests = mongo
            .collection::<AdoptionRequestDoc>(ADOPTION_REQUEST_COLLECTION)
            .await?;
        let reports = mongo.collection::<ReportDoc>(REPORT_COLLECTION).await?;
        let species = mongo.collection::<SpeciesDoc>(SPECIES_COLLECTION).await?;
        let races = mongo.collection::<RaceDoc>(RACE_COLLECTION).await?;

        let resolver = Resolver::new(mongo.database());
        let projector = Projector::new(resolver.clone());

        Ok(Self {
            args,
            mongo,
            animals,
            donations,
            shelters,
            articles,
            adoption_requests,
            reports,
            species,
            races,
            resolver,
            projector,
            started_at: Instant::now(),
        })
    }
}

/// Start the HTTP server; returns after a shutdown signal
pub async fn run(state: Arc<AppState>) -> Result<(), RefugeError> {
    let listener = TcpListener::bind(state.args.listen)
        .await
        .map_err(|e| RefugeError::Http(format!("failed to bind {}: {}", state.args.listen, e)))?;

    info!(
        "Refuge listening on {} as node {}",
        state.args.listen, state.args.node_id
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, draining connections");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            let io = TokioIo::new(stream);

                            let service = service_fn(move |req| {
                                let state = Arc::clone(&state);
                                async move { handle_request(state, addr, req).await }
                            });

                            if let Err(err) = http1::Builder::new()
                                .serve_connection(io, service)
                                .await
                            {
                                error!("Error serving connection from {}: {:?}", addr, err);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {:?}", e);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    info!("[{}] {} {}", addr, method, path);

    let response = match (method.clone(), path.as_str()) {
        // CORS preflight
        (Method::OPTIONS, _) => routes::preflight_response(),

        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state)).await
        }

        // Readiness probe - requires a reachable store
        (Method::GET, "/ready") | (Method::GET, "/readyz") => {
            routes::readiness_check(Arc::clone(&state)).await
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // Animals
        (Method::GET, "/api/v1/animals") => {
            routes::animals::list(Arc::clone(&state), query.as_deref()).await
        }
        (Method::POST, "/api/v1/animals") => {
            routes::animals::create(Arc::clone(&state), req).await
        }

        // Donations
        (Method::GET, "/api/v1/donations") => {
            routes::donations::list(Arc::clone(&state), query.as_deref()).await
        }
        (Method::POST, "/api/v1/donations") => {
            routes::donations::create(Arc::clone(&state), req).await
        }

        // Shelters
        (Method::GET, "/api/v1/shelters") => {
            routes::shelters::list(Arc::clone(&state), query.as_deref()).await
        }
        (Method::POST, "/api/v1/shelters") => {
            routes::shelters::create(Arc::clone(&state), req).await
        }

        // Articles
        (Method::GET, "/api/v1/articles") => {
            routes::articles::list(Arc::clone(&state), query.as_deref()).await
        }
        (Method::POST, "/api/v1/articles") => {
            routes::articles::create(Arc::clone(&state), req).await
        }

        // Reports
        (Method::GET, "/api/v1/reports") => {
            routes::reports::list(Arc::clone(&state), query.as_deref()).await
        }
        (Method::POST, "/api/v1/reports") => {
            routes::reports::create(Arc::clone(&state), req).await
        }

        // Adoption requests
        (Method::POST, "/api/v1/adoptions") => {
            routes::adoptions::create(Arc::clone(&state), req).await
        }

        // Reference data
        (Method::GET, "/api/v1/species") => {
            routes::species::list_species(Arc::clone(&state), query.as_deref()).await
        }
        (Method::GET, "/api/v1/races") => {
            routes::species::list_races(Arc::clone(&state), query.as_deref()).await
        }

        // Parameterized routes
        (m, p) => dispatch_with_id(state, m, p, req).await,
    };

    Ok(response)
}

/// Dispatch routes of the form `/api/v1/{entity}/{id}`
async fn dispatch_with_id(
    state: Arc<AppState>,
    method: Method,
    path: &str,
    req: Request<Incoming>,
) -> Response<Full<Bytes>> {
    if let Some(id) = path_tail(path, "/api/v1/animals") {
        return match method {
            Method::GET => routes::animals::get(state, id).await,
            Method::PATCH => routes::animals::update(state, req, id).await,
            Method::DELETE => routes::animals::delete(state, req, id).await,
            _ => method_not_allowed(),
        };
    }

    if let Some(id) = path_tail(path, "/api/v1/donations") {
        return match method {
            Method::GET => routes::donations::get(state, id).await,
            Method::DELETE => routes::donations::delete(state, req, id).await,
            _ => method_not_allowed(),
        };
    }

    if let Some(id) = path_tail(path, "/api/v1/shelters") {
        return match method {
            Method::GET => routes::shelters::get(state, id).await,
            Method::DELETE => routes::shelters::delete(state, req, id).await,
            _ => method_not_allowed(),
        };
    }

    if let Some(id) = path_tail(path, "/api/v1/articles") {
        return match method {
            Method::GET => routes::articles::get(state, id).await,
            _ => method_not_allowed(),
        };
    }

    if let Some(id) = path_tail(path, "/api/v1/reports") {
        return match method {
            Method::GET => routes::reports::get(state, id).await,
            _ => method_not_allowed(),
        };
    }

    if let Some(id) = path_tail(path, "/api/v1/adoptions") {
        return match method {
            Method::GET => routes::adoptions::get(state, req, id).await,
            Method::PATCH => routes::adoptions::decide(state, req, id).await,
            _ => method_not_allowed(),
        };
    }

    if let Some(reference) = path_tail(path, "/api/v1/species") {
        return match method {
            Method::GET => routes::species::get_species(state, reference).await,
            _ => method_not_allowed(),
        };
    }

    if let Some(reference) = path_tail(path, "/api/v1/races") {
        return match method {
            Method::GET => routes::species::get_race(state, reference).await,
            _ => method_not_allowed(),
        };
    }

    routes::error_response(&RefugeError::NotFound(format!("route {}", path)))
}

/// Extract the single trailing segment after `prefix`, if any
fn path_tail<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    let rest = rest.strip_prefix('/')?;
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}

fn method_not_allowed() -> Response<Full<Bytes>> {
    routes::json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &serde_json::json!({ "error": "Method not allowed", "kind": "METHOD_NOT_ALLOWED" }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_tail_extracts_single_segment() {
        assert_eq!(
            path_tail("/api/v1/animals/64f1a2b3", "/api/v1/animals"),
            Some("64f1a2b3")
        );
        assert_eq!(path_tail("/api/v1/animals", "/api/v1/animals"), None);
        assert_eq!(path_tail("/api/v1/animals/", "/api/v1/animals"), None);
        assert_eq!(
            path_tail("/api/v1/animals/a/b", "/api/v1/animals"),
            None
        );
        assert_eq!(path_tail("/api/v1/species/dog", "/api/v1/species"), Some("dog"));
        assert_eq!(path_tail("/other", "/api/v1/animals"), None);
    }
}
