use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Author, AuthorPatch, PopulatedPost, Post, PostPatch};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    ///
    /// Fails with `RepoError::Constraint` when a unique field collides.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Deleting a missing entity is not an error.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Up to `limit` posts with their author populated and comments left out.
    async fn list_populated(&self, limit: u64) -> Result<Vec<PopulatedPost>, RepoError>;

    /// A single post, comments included, with its author populated.
    async fn find_populated(&self, id: Uuid) -> Result<Option<PopulatedPost>, RepoError>;

    /// Apply `patch` to the stored post. Returns `None` if the post does not exist.
    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError>;

    /// Remove every post referencing `author_id`, returning how many went.
    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

/// Author repository with domain-specific methods.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    /// Up to `limit` authors.
    async fn list(&self, limit: u64) -> Result<Vec<Author>, RepoError>;

    /// Find an author by their unique user name.
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<Author>, RepoError>;

    /// Apply `patch` to the stored author. Returns `None` if the author does not exist.
    async fn update(&self, id: Uuid, patch: AuthorPatch) -> Result<Option<Author>, RepoError>;
}
