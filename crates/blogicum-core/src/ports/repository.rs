use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentCard, Location, Post, PostCard, User};
use crate::error::RepoError;
use crate::pagination::PageInfo;
use crate::visibility::Visibility;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Category repository. Categories are reference data.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// A published category with the given slug.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// Every category, ordered by title.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

/// Location repository. Locations are reference data.
#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// Every location, ordered by name.
    async fn list_all(&self) -> Result<Vec<Location>, RepoError>;
}

/// Selection of posts for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    pub visibility: Visibility,
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

impl PostFilter {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            author_id: None,
            category_id: None,
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Post repository.
///
/// Deleting a post must also delete its comments.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Number of posts matching `filter`.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// The page of matching posts described by `page`, newest `pub_date` first,
    /// each annotated with its comment count.
    async fn list(&self, filter: &PostFilter, page: &PageInfo) -> Result<Vec<PostCard>, RepoError>;

    /// A single post with its author, category, location and comment count.
    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentCard>, RepoError>;

    /// A comment, only if it belongs to `post_id`.
    async fn find_in_post(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>, RepoError>;
}
