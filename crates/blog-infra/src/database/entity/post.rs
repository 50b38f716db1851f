//! Post entity for SeaORM. Comments are embedded as a JSON array.

use sea_orm::entity::prelude::*;
use sea_orm::{FromQueryResult, Set};

use blog_core::domain::Comment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub comments: Json,
    pub created: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id"
    )]
    Author,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A post row without its comments, for list queries.
#[derive(Debug, FromQueryResult)]
pub struct Summary {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub created: DateTimeWithTimeZone,
}

/// The columns `Summary` selects.
pub const SUMMARY_COLUMNS: [Column; 5] = [
    Column::Id,
    Column::AuthorId,
    Column::Title,
    Column::Content,
    Column::Created,
];

fn decode_comments(raw: Json) -> Vec<Comment> {
    serde_json::from_value(raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Unreadable comments column, treating as empty");
        Vec::new()
    })
}

fn encode_comments(comments: &[Comment]) -> Json {
    serde_json::to_value(comments).unwrap_or_else(|_| Json::Array(Vec::new()))
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for blog_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            author_id: model.author_id,
            title: model.title,
            content: model.content,
            comments: decode_comments(model.comments),
            created: model.created.into(),
        }
    }
}

impl From<Summary> for blog_core::domain::Post {
    fn from(row: Summary) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            content: row.content,
            comments: Vec::new(),
            created: row.created.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<blog_core::domain::Post> for ActiveModel {
    fn from(post: blog_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title),
            content: Set(post.content),
            comments: Set(encode_comments(&post.comments)),
            created: Set(post.created.into()),
        }
    }
}
