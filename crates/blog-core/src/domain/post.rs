use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Author, require_text};
use crate::error::DomainError;

/// A comment embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub content: String,
}

/// Post entity - a blog post referencing its author by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub comments: Vec<Comment>,
    /// Supplied by the client, not assigned by the server.
    pub created: DateTime<Utc>,
}

impl Post {
    /// Create a new post with a generated ID and no comments.
    pub fn new(
        author_id: Uuid,
        title: String,
        content: String,
        created: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        require_text("title", &title)?;
        require_text("content", &content)?;

        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            content,
            comments: Vec::new(),
            created,
        })
    }

    /// Attach the initial comments.
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Result<Self, DomainError> {
        for comment in &comments {
            require_text("comments.content", &comment.content)?;
        }
        self.comments = comments;
        Ok(self)
    }

    /// Apply a partial update. The patch must have been validated.
    pub fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
    }
}

/// The mutable subset of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(content) = &self.content {
            require_text("content", content)?;
        }
        Ok(())
    }
}

/// A post with its author reference resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedPost {
    pub post: Post,
    /// `None` when the reference no longer resolves.
    pub author: Option<Author>,
}

impl PopulatedPost {
    /// Display name of the author, empty when unresolved.
    pub fn author_name(&self) -> String {
        self.author
            .as_ref()
            .map(Author::full_name)
            .unwrap_or_default()
    }
}
