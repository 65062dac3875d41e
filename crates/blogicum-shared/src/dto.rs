//! Page contexts - the data each page of the blog is rendered from.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public information about a post or comment author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    pub id: Uuid,
    pub name: String,
}

/// A post as shown in listings and on its detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorView,
    pub category: Option<CategoryView>,
    pub location: Option<LocationView>,
    pub image: Option<String>,
    pub is_published: bool,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorView,
}

/// The profile owner shown above their posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Only filled in for the owner's own view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub date_joined: DateTime<Utc>,
}

/// One page of a listing with its navigation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

impl<T> PageView<T> {
    pub fn new(object_list: Vec<T>, number: u64, num_pages: u64, per_page: u64, count: u64) -> Self {
        let has_next = number < num_pages;
        let has_previous = number > 1;

        Self {
            object_list,
            number,
            num_pages,
            per_page,
            count,
            has_next,
            has_previous,
            next_page_number: has_next.then_some(number + 1),
            previous_page_number: has_previous.then(|| number - 1),
        }
    }
}

/// Submitted (or initial) form values with their validation errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormView<F> {
    pub data: F,
    pub errors: BTreeMap<String, Vec<String>>,
}

impl<F> FormView<F> {
    /// A form that has not been validated yet.
    pub fn unbound(data: F) -> Self {
        Self {
            data,
            errors: BTreeMap::new(),
        }
    }

    pub fn with_errors(data: F, errors: BTreeMap<String, Vec<String>>) -> Self {
        Self { data, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// An option of a select field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceView {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexPage {
    pub page_obj: PageView<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPage {
    pub category: CategoryView,
    pub page_obj: PageView<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePage {
    pub profile: ProfileView,
    pub is_owner: bool,
    pub page_obj: PageView<PostView>,
}

/// A post with its comments and an empty comment form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailPage<F> {
    pub post: PostView,
    pub comments: Vec<CommentView>,
    pub form: FormView<F>,
}

/// Create/edit form for a post with the available select choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormPage<F> {
    pub form: FormView<F>,
    pub categories: Vec<ChoiceView>,
    pub locations: Vec<ChoiceView>,
}

/// Confirmation page shown before a post is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDeletePage {
    pub post: PostView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentFormPage<F> {
    pub post_id: Uuid,
    pub comment: CommentView,
    pub form: FormView<F>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDeletePage {
    pub post_id: Uuid,
    pub comment: CommentView,
}

/// A page holding nothing but a form (login, registration, profile editing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormPage<F> {
    pub form: FormView<F>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
