//! Post handlers.

use actix_web::{HttpResponse, web};

use blog_core::domain::{PopulatedPost, Post, PostPatch};
use blog_core::ports::{BaseRepository, PostRepository};
use blog_shared::dto::{
    CreatePostRequest, POST_REQUIRED_FIELDS, PostListResponse, PostResponse, UpdatePostRequest,
};

use super::{JsonObject, decode, ensure_matching_id, not_found_error, parse_id, require_fields};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Most posts a list response carries.
const LIST_LIMIT: u64 = 5;

/// GET /posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_populated(LIST_LIMIT).await?;

    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: posts.iter().map(PostResponse::from).collect(),
    }))
}

/// GET /posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let raw_id = path.into_inner();
    let post = match parse_id(&raw_id) {
        Some(id) => state.posts.find_populated(id).await?,
        None => None,
    };
    let post = post.ok_or_else(|| not_found_error("Post", &raw_id))?;

    Ok(HttpResponse::Ok().json(PostResponse::from(&post)))
}

/// POST /posts
///
/// The referenced author must exist; the post is never stored with a
/// dangling author.
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<JsonObject>,
) -> AppResult<HttpResponse> {
    let mut body = body.into_inner();
    CreatePostRequest::canonicalize(&mut body);
    require_fields(&body, POST_REQUIRED_FIELDS)?;
    let req: CreatePostRequest = decode(body)?;

    let author = state.authors.find_by_id(req.author).await?.ok_or_else(|| {
        tracing::warn!(author_id = %req.author, "Post references unknown author");
        AppError::BadRequest(format!("Author {} does not exist", req.author))
    })?;

    let post = Post::new(author.id, req.title, req.content, req.created)?
        .with_comments(req.comments.into_iter().map(Into::into).collect())?;
    let post = state.posts.insert(post).await?;
    tracing::info!(post_id = %post.id, author_id = %author.id, "Post created");

    let populated = PopulatedPost {
        post,
        author: Some(author),
    };
    Ok(HttpResponse::Created().json(PostResponse::from(&populated)))
}

/// PUT /posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<JsonObject>,
) -> AppResult<HttpResponse> {
    let raw_id = path.into_inner();
    let body = body.into_inner();
    ensure_matching_id(&raw_id, &body)?;

    let patch: PostPatch = decode::<UpdatePostRequest>(body)?.into();
    patch.validate()?;

    let id = parse_id(&raw_id).ok_or_else(|| not_found_error("Post", &raw_id))?;
    state
        .posts
        .update(id, patch)
        .await?
        .ok_or_else(|| not_found_error("Post", &raw_id))?;
    tracing::info!(post_id = %id, "Post updated");

    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    if let Some(id) = parse_id(&path) {
        state.posts.delete(id).await?;
        tracing::info!(post_id = %id, "Post deleted");
    }

    Ok(HttpResponse::NoContent().finish())
}
