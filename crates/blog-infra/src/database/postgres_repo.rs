//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use blog_core::domain::{Author, AuthorPatch, PopulatedPost, Post, PostPatch};
use blog_core::error::RepoError;
use blog_core::ports::{AuthorRepository, PostRepository};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_populated(&self, limit: u64) -> Result<Vec<PopulatedPost>, RepoError> {
        let rows = PostEntity::find()
            .select_only()
            .columns(post::SUMMARY_COLUMNS)
            .limit(limit)
            .into_model::<post::Summary>()
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let mut author_ids: Vec<Uuid> = rows.iter().map(|r| r.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<Uuid, Author> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            AuthorEntity::find()
                .filter(author::Column::Id.is_in(author_ids))
                .all(&self.db)
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let author = authors.get(&row.author_id).cloned();
                PopulatedPost {
                    post: row.into(),
                    author,
                }
            })
            .collect())
    }

    async fn find_populated(&self, id: Uuid) -> Result<Option<PopulatedPost>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .find_also_related(AuthorEntity)
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(|(post, author)| PopulatedPost {
            post: post.into(),
            author: author.map(Into::into),
        }))
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let Some(model) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(model.into()));
        }

        let mut active: post::ActiveModel = model.into();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(content) = patch.content {
            active.content = Set(content);
        }

        let updated = active.update(&self.db).await.map_err(write_error)?;
        Ok(Some(updated.into()))
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn list(&self, limit: u64) -> Result<Vec<Author>, RepoError> {
        let result = AuthorEntity::find()
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<Author>, RepoError> {
        tracing::debug!(%user_name, "Finding author by user name");

        let result = AuthorEntity::find()
            .filter(author::Column::UserName.eq(user_name))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, id: Uuid, patch: AuthorPatch) -> Result<Option<Author>, RepoError> {
        let Some(model) = AuthorEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(model.into()));
        }

        let mut active: author::ActiveModel = model.into();
        if let Some(first_name) = patch.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = patch.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(user_name) = patch.user_name {
            active.user_name = Set(user_name);
        }

        let updated = active.update(&self.db).await.map_err(write_error)?;
        Ok(Some(updated.into()))
    }
}
