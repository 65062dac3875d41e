//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use blogicum_core::domain::{
    Author, Category, Comment, CommentCard, Location, Post, PostCard, User,
};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::PageInfo;
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostFilter, PostRepository,
    UserRepository,
};
use blogicum_core::visibility::Visibility;

use super::entity::{category, comment, location, post, user};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<user::Entity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<category::Entity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<location::Entity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<post::Entity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<comment::Entity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsPublished.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = category::Entity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list_all(&self) -> Result<Vec<Location>, RepoError> {
        let result = location::Entity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// SQL form of [`Visibility`]. Expects `categories` to be left-joined.
fn visibility_condition(visibility: &Visibility) -> Condition {
    match *visibility {
        Visibility::Published { now } => Condition::all()
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::PubDate.lte(now))
            .add(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            ),
        Visibility::Dated { now } => Condition::all().add(post::Column::PubDate.lte(now)),
        Visibility::Everything => Condition::all(),
    }
}

impl PostgresPostRepository {
    fn filtered(filter: &PostFilter) -> Select<post::Entity> {
        let mut query = post::Entity::find()
            .join(JoinType::LeftJoin, post::Relation::Category.def())
            .filter(visibility_condition(&filter.visibility));

        if let Some(author_id) = filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(post::Column::CategoryId.eq(category_id));
        }

        query
    }

    /// One page of `filter`, newest first. The id breaks timestamp ties so
    /// offset paging never repeats or skips a row.
    pub(crate) fn listing(filter: &PostFilter, page: &PageInfo) -> Select<post::Entity> {
        Self::filtered(filter)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
    }

    /// Attach authors, categories, locations and comment counts, batching one
    /// query per relation.
    async fn hydrate(&self, posts: Vec<post::Model>) -> Result<Vec<PostCard>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let author_ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let category_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.category_id).collect();
        let location_ids: Vec<Uuid> = posts.iter().filter_map(|p| p.location_id).collect();

        let authors: HashMap<Uuid, Author> = user::Entity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|model| {
                let user = User::from(model);
                (user.id, Author::from(&user))
            })
            .collect();

        let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            category::Entity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|model| (model.id, model.into()))
                .collect()
        };

        let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            location::Entity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|model| (model.id, model.into()))
                .collect()
        };

        let comment_counts: HashMap<Uuid, i64> = comment::Entity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .collect();

        posts
            .into_iter()
            .map(|model| {
                let post = Post::from(model);
                let author = authors.get(&post.author_id).cloned().ok_or_else(|| {
                    RepoError::Query(format!("author {} of post {} is missing", post.author_id, post.id))
                })?;

                Ok(PostCard {
                    author,
                    category: post.category_id.and_then(|id| categories.get(&id).cloned()),
                    location: post.location_id.and_then(|id| locations.get(&id).cloned()),
                    comment_count: comment_counts.get(&post.id).copied().unwrap_or(0).max(0) as u64,
                    post,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        Self::filtered(filter)
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn list(&self, filter: &PostFilter, page: &PageInfo) -> Result<Vec<PostCard>, RepoError> {
        let models = Self::listing(filter, page)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        self.hydrate(models).await
    }

    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, RepoError> {
        let Some(model) = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        Ok(self.hydrate(vec![model]).await?.pop())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentCard>, RepoError> {
        let rows = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let comment = Comment::from(comment);
                let author = author.map(User::from).ok_or_else(|| {
                    RepoError::Query(format!("author of comment {} is missing", comment.id))
                })?;

                Ok(CommentCard {
                    author: Author::from(&author),
                    comment,
                })
            })
            .collect()
    }

    async fn find_in_post(&self, post_id: Uuid, comment_id: Uuid) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}
