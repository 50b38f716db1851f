//! HTTP handlers and route configuration.

mod authors;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, Resource, error::JsonPayloadError, web};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use blog_core::error::DomainError;
use blog_shared::validation::missing_field_message;
use blog_shared::{ErrorResponse, missing_field};

use crate::middleware::error::{AppError, AppResult};

/// A request body, before any typed parsing.
type JsonObject = Map<String, Value>;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(resource("/health").route(web::get().to(health::health_check)))
        // Posts
        .service(
            resource("/posts")
                .route(web::get().to(posts::list))
                .route(web::post().to(posts::create)),
        )
        .service(
            resource("/posts/{id}")
                .route(web::get().to(posts::get))
                .route(web::put().to(posts::update))
                .route(web::delete().to(posts::delete)),
        )
        // Authors
        .service(
            resource("/authors")
                .route(web::get().to(authors::list))
                .route(web::post().to(authors::create)),
        )
        .service(
            resource("/authors/{id}")
                .route(web::get().to(authors::get))
                .route(web::put().to(authors::update))
                .route(web::delete().to(authors::delete)),
        )
        .default_service(web::to(not_found));
}

/// A resource whose unmatched verbs answer like an unknown path.
fn resource(path: &str) -> Resource {
    web::resource(path).default_service(web::to(not_found))
}

/// Catch-all for unknown paths and verbs.
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::not_found())
}

/// Malformed or non-object JSON bodies are client errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            JsonPayloadError::ContentType => "Expected a JSON request body".to_string(),
            other => format!("Invalid JSON body: {other}"),
        };
        AppError::BadRequest(message).into()
    })
}

/// Path ids that are not UUIDs name no record.
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn not_found_error(entity_type: &'static str, id: &str) -> AppError {
    DomainError::NotFound {
        entity_type,
        id: id.to_string(),
    }
    .into()
}

/// First missing required field short-circuits with a 400.
fn require_fields(body: &JsonObject, required: &[&str]) -> AppResult<()> {
    match missing_field(body, required) {
        Some(field) => Err(AppError::BadRequest(missing_field_message(field))),
        None => Ok(()),
    }
}

/// Updates must carry an `id` equal to the one in the path.
fn ensure_matching_id(path_id: &str, body: &JsonObject) -> AppResult<()> {
    let body_id = match body.get("id") {
        Some(Value::String(id)) if id == path_id => return Ok(()),
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "undefined".to_string(),
    };

    Err(AppError::BadRequest(format!(
        "Request path id ({path_id}) must match request body id ({body_id})"
    )))
}

fn decode<T: DeserializeOwned>(body: JsonObject) -> AppResult<T> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}
