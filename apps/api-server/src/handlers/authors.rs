//! Author handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{Author, AuthorPatch};
use blog_core::error::DomainError;
use blog_core::ports::{AuthorRepository, BaseRepository, PostRepository};
use blog_shared::dto::{
    AUTHOR_REQUIRED_FIELDS, AuthorListResponse, AuthorResponse, CreateAuthorRequest,
    UpdateAuthorRequest,
};

use super::{JsonObject, decode, ensure_matching_id, not_found_error, parse_id, require_fields};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Most authors a list response carries.
const LIST_LIMIT: u64 = 10;

/// GET /authors
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let authors = state.authors.list(LIST_LIMIT).await?;

    Ok(HttpResponse::Ok().json(AuthorListResponse {
        authors: authors.iter().map(AuthorResponse::from).collect(),
    }))
}

/// GET /authors/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let raw_id = path.into_inner();
    let author = match parse_id(&raw_id) {
        Some(id) => state.authors.find_by_id(id).await?,
        None => None,
    };
    let author = author.ok_or_else(|| not_found_error("Author", &raw_id))?;

    Ok(HttpResponse::Ok().json(AuthorResponse::from(&author)))
}

/// POST /authors
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<JsonObject>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    require_fields(&body, AUTHOR_REQUIRED_FIELDS)?;
    let req: CreateAuthorRequest = decode(body)?;

    ensure_user_name_free(&state, &req.user_name, None).await?;

    let author = Author::new(req.first_name, req.last_name, req.user_name)?;
    // The store's unique index still catches a concurrent claim.
    let author = state.authors.insert(author).await?;
    tracing::info!(author_id = %author.id, "Author created");

    Ok(HttpResponse::Created().json(AuthorResponse::from(&author)))
}

/// PUT /authors/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<JsonObject>,
) -> AppResult<HttpResponse> {
    let raw_id = path.into_inner();
    let body = body.into_inner();
    ensure_matching_id(&raw_id, &body)?;

    let patch: AuthorPatch = decode::<UpdateAuthorRequest>(body)?.into();
    patch.validate()?;

    let id = parse_id(&raw_id).ok_or_else(|| not_found_error("Author", &raw_id))?;
    if patch.user_name.is_some() && state.authors.find_by_id(id).await?.is_none() {
        return Err(not_found_error("Author", &raw_id));
    }
    if let Some(user_name) = &patch.user_name {
        ensure_user_name_free(&state, user_name, Some(id)).await?;
    }

    state
        .authors
        .update(id, patch)
        .await?
        .ok_or_else(|| not_found_error("Author", &raw_id))?;
    tracing::info!(author_id = %id, "Author updated");

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /authors/{id}
///
/// Removes the author's posts first, then the author. The two steps are not
/// atomic.
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    if let Some(id) = parse_id(&path) {
        let removed = state.posts.delete_by_author(id).await?;
        state.authors.delete(id).await?;
        tracing::info!(author_id = %id, posts_removed = removed, "Author deleted");
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Fails with `Duplicate` if another author already holds `user_name`.
async fn ensure_user_name_free(
    state: &AppState,
    user_name: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    match state.authors.find_by_user_name(user_name).await? {
        Some(holder) if Some(holder.id) != except => {
            Err(DomainError::Duplicate(format!("Username {user_name} already taken")).into())
        }
        _ => Ok(()),
    }
}
