use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a blog publication.
///
/// A post may be dated in the future; it stays hidden from the public until
/// `pub_date` has passed (see [`crate::visibility`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// The client-editable part of a post, produced by a validated post form.
///
/// `author_id` and `is_published` are not client-editable and have no field here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub image: Option<String>,
}

impl Post {
    /// Create a new published post owned by `author_id`.
    pub fn new(author_id: Uuid, draft: PostDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date,
            author_id,
            category_id: draft.category_id,
            location_id: draft.location_id,
            image: draft.image,
            is_published: true,
            created_at: now,
        }
    }

    /// Overwrite the editable fields, keeping identity, ownership and flags.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.text = draft.text;
        self.pub_date = draft.pub_date;
        self.category_id = draft.category_id;
        self.location_id = draft.location_id;
        self.image = draft.image;
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}
