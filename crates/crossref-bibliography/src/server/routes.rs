//! HTTP routes.
//!
//! Every operation endpoint answers 200 with a tagged body; failures are
//! reported in-band, never as an error status.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::openapi;
use crate::config::{Config, api};
use crate::models::{Outcome, SearchQuery};
use crate::pipeline::PipelineContext;
use crate::sanitize::{Sanitize, sanitize_str};

/// Shared state for HTTP handlers.
#[derive(Debug)]
pub struct HttpState {
    pub pipeline: PipelineContext,
    /// Public URL announced in the plugin manifest.
    pub public_url: String,
    pub contact_email: String,
    pub policy_url: String,
}

/// Create the HTTP router.
pub fn create_router(pipeline: PipelineContext, config: &Config) -> Router {
    let state = Arc::new(HttpState {
        pipeline,
        public_url: config.public_url.clone(),
        contact_email: config.contact_email.clone(),
        policy_url: config.policy_url.clone(),
    });

    Router::new()
        .route("/", get(root_redirect))
        .route("/health", get(health_check))
        .route("/freetext_to_crossref_items", get(freetext_to_crossref_items))
        .route("/freetext_to_crossref_items/", get(freetext_to_crossref_items))
        .route("/crossref_items_to_dois", get(crossref_items_to_dois))
        .route("/crossref_items_to_dois/", get(crossref_items_to_dois))
        .route("/freetext_to_bibtex", get(freetext_to_bibtex))
        .route("/freetext_to_bibtex/", get(freetext_to_bibtex))
        .route("/add_bibtex_to_zotero", post(add_bibtex_to_zotero))
        .route("/add_bibtex_to_zotero/", post(add_bibtex_to_zotero))
        .route("/openapi.json", get(openapi_document))
        .route("/openapi.yaml", get(openapi_document))
        .route("/.well-known/ai-plugin.json", get(plugin_manifest))
        .nest_service("/static", ServeDir::new(static_dir(config)))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn static_dir(config: &Config) -> PathBuf {
    config.static_dir.clone()
}

/// Mirror the caller's origin, with credentials, like the plugin host expects.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([header::CONTENT_DISPOSITION])
}

async fn root_redirect() -> Redirect {
    Redirect::temporary(api::PROJECT_URL)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "crossref-bibliography",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The search term, or the diagnostic to answer with instead.
///
/// A query string the extractor rejects is answered in-band like a missing term.
fn search_term<T>(
    query: &Result<Query<SearchQuery>, QueryRejection>,
) -> Result<&str, Vec<Outcome<T>>> {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            let reason = rejection.body_text();
            tracing::debug!(error = %sanitize_str(&reason), "Rejected query string");
            return Err(vec![Outcome::diagnostic(format!("Invalid query string: {reason}"))]);
        }
    };
    match query.search_term.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => Ok(term),
        _ => Err(vec![Outcome::diagnostic("Missing required query parameter: search_term")]),
    }
}

async fn freetext_to_crossref_items(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> impl IntoResponse {
    let outcomes = match search_term(&query) {
        Ok(term) => {
            tracing::info!(search_term = %sanitize_str(term), "freetext_to_crossref_items");
            state.pipeline.records(term).await
        }
        Err(diagnostic) => diagnostic,
    };
    Json(outcomes.sanitize())
}

async fn crossref_items_to_dois(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> impl IntoResponse {
    let outcomes = match search_term(&query) {
        Ok(term) => {
            tracing::info!(search_term = %sanitize_str(term), "crossref_items_to_dois");
            state.pipeline.dois(term).await
        }
        Err(diagnostic) => diagnostic,
    };
    Json(outcomes.sanitize())
}

async fn freetext_to_bibtex(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> impl IntoResponse {
    let outcomes = match search_term(&query) {
        Ok(term) => {
            tracing::info!(search_term = %sanitize_str(term), "freetext_to_bibtex");
            state.pipeline.citations(term).await
        }
        Err(diagnostic) => diagnostic,
    };
    Json(outcomes.sanitize())
}

async fn add_bibtex_to_zotero(State(state): State<Arc<HttpState>>, body: Bytes) -> impl IntoResponse {
    let message = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(body) => state.pipeline.forward(&body).await,
        Err(err) => format!("Request body must be a JSON object: {err}"),
    };
    Json(json!({ "message": message.sanitize() }))
}

async fn openapi_document() -> impl IntoResponse {
    Json(openapi::document())
}

async fn plugin_manifest(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(json!({
        "schema_version": "v1",
        "name_for_human": "Bibliography Generator",
        "name_for_model": "bibliography_generator",
        "description_for_human": "Find scholarly works with Crossref, get BibTeX, and save it to Zotero.",
        "description_for_model": "Search Crossref for scholarly works from a free-text query, return BibTeX citations, and add BibTeX to a Zotero collection when the user supplies Zotero credentials.",
        "auth": {"type": "none"},
        "api": {
            "type": "openapi",
            "url": format!("{}/openapi.yaml", state.public_url),
            "is_user_authenticated": false
        },
        "logo_url": format!("{}/static/logo.png", state.public_url),
        "contact_email": state.contact_email,
        "legal_info_url": state.policy_url
    }))
}
