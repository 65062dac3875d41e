//! In-memory storage - used when no database is configured, and in tests.
//!
//! All repositories handed out by one [`InMemoryStore`] share the same tables,
//! and deletions follow the same referential rules as the SQL schema.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, Comment, CommentCard, Location, Post, PostCard, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::PageInfo;
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostFilter,
    PostRepository, UserRepository,
};

#[derive(Default)]
pub(crate) struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn author(&self, user_id: Uuid) -> Result<Author, RepoError> {
        self.users
            .get(&user_id)
            .map(Author::from)
            .ok_or_else(|| RepoError::Query(format!("user {user_id} is missing")))
    }

    fn card(&self, post: &Post) -> Result<PostCard, RepoError> {
        Ok(PostCard {
            post: post.clone(),
            author: self.author(post.author_id)?,
            category: post.category_id.and_then(|id| self.categories.get(&id).cloned()),
            location: post.location_id.and_then(|id| self.locations.get(&id).cloned()),
            comment_count: self
                .comments
                .values()
                .filter(|c| c.post_id == post.id)
                .count() as u64,
        })
    }

    /// Posts matching `filter`, newest first.
    fn matching_posts(&self, filter: &PostFilter) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self
            .posts
            .values()
            .filter(|p| filter.author_id.is_none_or(|id| p.author_id == id))
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id == Some(id)))
            .filter(|p| {
                let category = p.category_id.and_then(|id| self.categories.get(&id));
                filter.visibility.admits(p, category)
            })
            .collect();
        posts.sort_by(|a, b| {
            b.pub_date
                .cmp(&a.pub_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        posts
    }

    fn remove_post(&mut self, post_id: Uuid) {
        self.posts.remove(&post_id);
        self.comments.retain(|_, c| c.post_id != post_id);
    }
}

/// An entity kept in one of the in-memory tables.
pub(crate) trait Stored: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Unique-constraint check before the row is written.
    fn check_unique(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Referential clean-up after the row `id` was removed.
    fn on_delete(_tables: &mut Tables, _id: Uuid) {}
}

impl Stored for User {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }
    fn check_unique(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .users
            .values()
            .any(|u| u.username == self.username && u.id != self.id);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username {} already exists",
                self.username
            )));
        }
        Ok(())
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
    }
}

impl Stored for Category {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }
    fn check_unique(&self, tables: &Tables) -> Result<(), RepoError> {
        if tables.categories.values().any(|c| c.slug == self.slug && c.id != self.id) {
            return Err(RepoError::Constraint(format!("slug {} already exists", self.slug)));
        }
        Ok(())
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        for post in tables.posts.values_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
    }
}

impl Stored for Location {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        for post in tables.posts.values_mut().filter(|p| p.location_id == Some(id)) {
            post.location_id = None;
        }
    }
}

impl Stored for Post {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }
    fn on_delete(tables: &mut Tables, id: Uuid) {
        tables.remove_post(id);
    }
}

impl Stored for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }
}

/// Generic in-memory repository over one table of a shared store.
pub(crate) struct InMemoryRepository<T> {
    tables: Arc<RwLock<Tables>>,
    _entity: PhantomData<T>,
}

impl<T> InMemoryRepository<T> {
    fn new(tables: Arc<RwLock<Tables>>) -> Self {
        Self {
            tables,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        entity.check_unique(&tables)?;
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::table_mut(&mut tables).remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        T::on_delete(&mut tables, id);
        Ok(())
    }
}

type InMemoryUserRepository = InMemoryRepository<User>;
type InMemoryCategoryRepository = InMemoryRepository<Category>;
type InMemoryLocationRepository = InMemoryRepository<Location>;
type InMemoryPostRepository = InMemoryRepository<Post>;
type InMemoryCommentRepository = InMemoryRepository<Comment>;

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .values()
            .find(|c| c.slug == slug && c.is_published)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<Location> = tables.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching_posts(filter).len() as u64)
    }

    async fn list(&self, filter: &PostFilter, page: &PageInfo) -> Result<Vec<PostCard>, RepoError> {
        let tables = self.tables.read().await;
        let posts = page.slice(tables.matching_posts(filter));
        posts.into_iter().map(|post| tables.card(post)).collect()
    }

    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, RepoError> {
        let tables = self.tables.read().await;
        tables.posts.get(&id).map(|post| tables.card(post)).transpose()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentCard>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        comments
            .into_iter()
            .map(|comment| {
                Ok(CommentCard {
                    comment: comment.clone(),
                    author: tables.author(comment.author_id)?,
                })
            })
            .collect()
    }

    async fn find_in_post(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&comment_id)
            .filter(|c| c.post_id == post_id)
            .cloned())
    }
}

/// Shared in-memory tables and the repositories over them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(InMemoryRepository::<User>::new(self.tables.clone()))
    }

    pub fn categories(&self) -> Arc<dyn CategoryRepository> {
        Arc::new(InMemoryRepository::<Category>::new(self.tables.clone()))
    }

    pub fn locations(&self) -> Arc<dyn LocationRepository> {
        Arc::new(InMemoryRepository::<Location>::new(self.tables.clone()))
    }

    pub fn posts(&self) -> Arc<dyn PostRepository> {
        Arc::new(InMemoryRepository::<Post>::new(self.tables.clone()))
    }

    pub fn comments(&self) -> Arc<dyn CommentRepository> {
        Arc::new(InMemoryRepository::<Comment>::new(self.tables.clone()))
    }
}
