//! Domain entities - the core business objects.

mod author;
mod post;

pub use author::{Author, AuthorPatch};
pub use post::{Comment, PopulatedPost, Post, PostPatch};

use crate::error::DomainError;

/// Reject blank text for a required field.
fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("`{field}` must not be empty")));
    }
    Ok(())
}
