//! Start-up schema bootstrap.
//!
//! Tables are generated from the entities, so the `authors.user_name` unique
//! constraint and the `posts.author_id` foreign key follow the model
//! attributes. Every statement is `IF NOT EXISTS`; running it against an
//! existing database is a no-op.

use sea_orm::{ConnectionTrait, DbBackend, DbErr, Schema, Statement};

use super::entity::{author, post};

/// `CREATE TABLE` statements in dependency order: authors before posts.
pub fn create_table_statements(backend: DbBackend) -> Vec<Statement> {
    let schema = Schema::new(backend);

    let mut authors = schema.create_table_from_entity(author::Entity);
    authors.if_not_exists();

    let mut posts = schema.create_table_from_entity(post::Entity);
    posts.if_not_exists();

    vec![backend.build(&authors), backend.build(&posts)]
}

/// Create any missing tables.
pub async fn ensure_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    for stmt in create_table_statements(backend) {
        db.execute(stmt).await?;
    }
    tracing::info!("Database schema ready");
    Ok(())
}
