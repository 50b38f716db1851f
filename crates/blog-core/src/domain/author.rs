use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::require_text;
use crate::error::DomainError;

/// Author entity - the writer a post references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all authors.
    pub user_name: String,
}

impl Author {
    /// Create a new author with a generated ID.
    pub fn new(
        first_name: String,
        last_name: String,
        user_name: String,
    ) -> Result<Self, DomainError> {
        require_text("firstName", &first_name)?;
        require_text("lastName", &last_name)?;
        require_text("userName", &user_name)?;

        Ok(Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            user_name,
        })
    }

    /// `"{first} {last}"`, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Apply a partial update. The patch must have been validated.
    pub fn apply(&mut self, patch: AuthorPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(user_name) = patch.user_name {
            self.user_name = user_name;
        }
    }
}

/// The mutable subset of an author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_name: Option<String>,
}

impl AuthorPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.user_name.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(first_name) = &self.first_name {
            require_text("firstName", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_text("lastName", last_name)?;
        }
        if let Some(user_name) = &self.user_name {
            require_text("userName", user_name)?;
        }
        Ok(())
    }
}
