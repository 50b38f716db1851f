//! Both collections behind one lock, so populating a post's author reads a
//! consistent snapshot.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Author, AuthorPatch, PopulatedPost, Post, PostPatch};
use blog_core::error::RepoError;
use blog_core::ports::{AuthorRepository, BaseRepository, PostRepository};

#[derive(Default)]
struct Collections {
    /// Insertion order is list order.
    posts: Vec<Post>,
    authors: Vec<Author>,
}

impl Collections {
    fn author(&self, id: Uuid) -> Option<&Author> {
        self.authors.iter().find(|a| a.id == id)
    }

    fn populate(&self, post: Post) -> PopulatedPost {
        let author = self.author(post.author_id).cloned();
        PopulatedPost { post, author }
    }

    fn user_name_taken(&self, user_name: &str, except: Option<Uuid>) -> bool {
        self.authors
            .iter()
            .any(|a| a.user_name == user_name && Some(a.id) != except)
    }
}

/// In-memory store implementing both repository ports.
///
/// Note: Data is lost on process restart.
pub struct InMemoryStore {
    data: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Collections::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp(limit: u64) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

fn user_name_conflict(user_name: &str) -> RepoError {
    RepoError::Constraint(format!("userName `{user_name}` is already taken"))
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let data = self.data.read().await;
        Ok(data.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut data = self.data.write().await;
        if data.posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint(format!("post {} already exists", post.id)));
        }
        data.posts.push(post.clone());
        tracing::debug!(post_id = %post.id, "Post stored");
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut data = self.data.write().await;
        data.posts.retain(|p| p.id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_populated(&self, limit: u64) -> Result<Vec<PopulatedPost>, RepoError> {
        let data = self.data.read().await;
        let posts = data
            .posts
            .iter()
            .take(clamp(limit))
            .map(|p| {
                let mut post = p.clone();
                post.comments.clear();
                data.populate(post)
            })
            .collect();
        Ok(posts)
    }

    async fn find_populated(&self, id: Uuid) -> Result<Option<PopulatedPost>, RepoError> {
        let data = self.data.read().await;
        let post = data.posts.iter().find(|p| p.id == id).cloned();
        Ok(post.map(|p| data.populate(p)))
    }

    async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Option<Post>, RepoError> {
        let mut data = self.data.write().await;
        let Some(post) = data.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.apply(patch);
        Ok(Some(post.clone()))
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut data = self.data.write().await;
        let before = data.posts.len();
        data.posts.retain(|p| p.author_id != author_id);
        Ok((before - data.posts.len()) as u64)
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        let data = self.data.read().await;
        Ok(data.author(id).cloned())
    }

    async fn insert(&self, author: Author) -> Result<Author, RepoError> {
        let mut data = self.data.write().await;
        if data.authors.iter().any(|a| a.id == author.id) {
            return Err(RepoError::Constraint(format!("author {} already exists", author.id)));
        }
        if data.user_name_taken(&author.user_name, None) {
            return Err(user_name_conflict(&author.user_name));
        }
        data.authors.push(author.clone());
        tracing::debug!(author_id = %author.id, "Author stored");
        Ok(author)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut data = self.data.write().await;
        data.authors.retain(|a| a.id != id);
        Ok(())
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn list(&self, limit: u64) -> Result<Vec<Author>, RepoError> {
        let data = self.data.read().await;
        Ok(data.authors.iter().take(clamp(limit)).cloned().collect())
    }

    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<Author>, RepoError> {
        let data = self.data.read().await;
        Ok(data.authors.iter().find(|a| a.user_name == user_name).cloned())
    }

    async fn update(&self, id: Uuid, patch: AuthorPatch) -> Result<Option<Author>, RepoError> {
        let mut data = self.data.write().await;
        if let Some(user_name) = &patch.user_name {
            if data.user_name_taken(user_name, Some(id)) {
                return Err(user_name_conflict(user_name));
            }
        }
        let Some(author) = data.authors.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        author.apply(patch);
        Ok(Some(author.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blog_core::domain::Comment;
    use chrono::Utc;

    fn author(user_name: &str) -> Author {
        Author::new("Ada".into(), "Lovelace".into(), user_name.into()).unwrap()
    }

    fn post(author_id: Uuid, title: &str) -> Post {
        Post::new(author_id, title.into(), "C".into(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_user_name() {
        let store = InMemoryStore::new();
        BaseRepository::<Author, Uuid>::insert(&store, author("ada"))
            .await
            .unwrap();

        let err = BaseRepository::<Author, Uuid>::insert(&store, author("ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_find_populated_resolves_author_and_keeps_comments() {
        let store = InMemoryStore::new();
        let ada = BaseRepository::<Author, Uuid>::insert(&store, author("ada"))
            .await
            .unwrap();
        let stored = post(ada.id, "T")
            .with_comments(vec![Comment {
                content: "first".into(),
            }])
            .unwrap();
        let id = stored.id;
        BaseRepository::<Post, Uuid>::insert(&store, stored)
            .await
            .unwrap();

        let populated = store.find_populated(id).await.unwrap().unwrap();
        assert_eq!(populated.author_name(), "Ada Lovelace");
        assert_eq!(populated.post.comments.len(), 1);
    }

    #[tokio::test]
    async fn test_list_populated_caps_and_drops_comments() {
        let store = InMemoryStore::new();
        let author_id = Uuid::new_v4();
        for i in 0..8 {
            let p = post(author_id, &format!("post {i}"))
                .with_comments(vec![Comment {
                    content: "c".into(),
                }])
                .unwrap();
            BaseRepository::<Post, Uuid>::insert(&store, p).await.unwrap();
        }

        let posts = store.list_populated(5).await.unwrap();
        assert_eq!(posts.len(), 5);
        assert_eq!(posts[0].post.title, "post 0");
        assert!(posts.iter().all(|p| p.post.comments.is_empty()));
        // Unknown author resolves to nothing.
        assert!(posts.iter().all(|p| p.author_name().is_empty()));
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = InMemoryStore::new();
        let updated = PostRepository::update(&store, Uuid::new_v4(), PostPatch::default())
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_author_update_checks_user_name_against_others_only() {
        let store = InMemoryStore::new();
        let ada = BaseRepository::<Author, Uuid>::insert(&store, author("ada"))
            .await
            .unwrap();
        BaseRepository::<Author, Uuid>::insert(&store, author("grace"))
            .await
            .unwrap();

        let same = AuthorPatch {
            user_name: Some("ada".into()),
            ..Default::default()
        };
        assert!(AuthorRepository::update(&store, ada.id, same).await.is_ok());

        let taken = AuthorPatch {
            user_name: Some("grace".into()),
            ..Default::default()
        };
        let err = AuthorRepository::update(&store, ada.id, taken)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_delete_by_author_and_idempotent_delete() {
        let store = InMemoryStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        for author_id in [a, a, b] {
            BaseRepository::<Post, Uuid>::insert(&store, post(author_id, "T"))
                .await
                .unwrap();
        }

        assert_eq!(store.delete_by_author(a).await.unwrap(), 2);
        assert_eq!(store.list_populated(10).await.unwrap().len(), 1);

        let missing = Uuid::new_v4();
        BaseRepository::<Post, Uuid>::delete(&store, missing)
            .await
            .unwrap();
        BaseRepository::<Post, Uuid>::delete(&store, missing)
            .await
            .unwrap();
    }
}
