//! Data Transfer Objects - request/response types for the API.

use blog_core::domain::{Author, AuthorPatch, Comment, PopulatedPost, PostPatch};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Fields a post body must carry on create, checked in this order.
pub const POST_REQUIRED_FIELDS: &[&str] = &["title", "content", "author", "created"];

/// Fields an author body must carry on create, checked in this order.
pub const AUTHOR_REQUIRED_FIELDS: &[&str] = &["firstName", "lastName", "userName"];

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    /// Id of the referenced author.
    pub author: Uuid,
    #[serde(with = "created_format")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<CommentRequest>,
}

impl CreatePostRequest {
    /// Accept `author_id` as a spelling of `author`.
    ///
    /// `author` wins when both are present.
    pub fn canonicalize(body: &mut Map<String, Value>) {
        if let Some(author_id) = body.remove("author_id") {
            body.entry("author").or_insert(author_id);
        }
    }
}

/// A comment supplied alongside a new post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

impl From<CommentRequest> for Comment {
    fn from(req: CommentRequest) -> Self {
        Self {
            content: req.content,
        }
    }
}

/// Mutable post fields. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<UpdatePostRequest> for PostPatch {
    fn from(req: UpdatePostRequest) -> Self {
        Self {
            title: req.title,
            content: req.content,
        }
    }
}

/// Request to create an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorRequest {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
}

/// Mutable author fields. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthorRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
}

impl From<UpdateAuthorRequest> for AuthorPatch {
    fn from(req: UpdateAuthorRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            user_name: req.user_name,
        }
    }
}

/// Public representation of a post. Comments and the raw author are never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    /// The author's display name.
    pub author: String,
    pub created: String,
}

impl From<&PopulatedPost> for PostResponse {
    fn from(populated: &PopulatedPost) -> Self {
        let post = &populated.post;
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            content: post.content.clone(),
            author: populated.author_name(),
            created: format_created(&post.created),
        }
    }
}

/// Public representation of an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
}

impl From<&Author> for AuthorResponse {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.to_string(),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            user_name: author.user_name.clone(),
        }
    }
}

/// `GET /posts` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
}

/// `GET /authors` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorListResponse {
    pub authors: Vec<AuthorResponse>,
}

/// RFC 3339, UTC, millisecond precision: `2024-01-01T00:00:00.000Z`.
pub fn format_created(created: &DateTime<Utc>) -> String {
    created.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a client-supplied `created` value.
///
/// Accepts RFC 3339, a naive date-time (read as UTC) or a plain date
/// (midnight UTC).
pub fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

mod created_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(created: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_created(created))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_created(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid date `{raw}` for `created`")))
    }
}
