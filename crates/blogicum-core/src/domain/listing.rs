//! Read models assembled by repositories for listings and detail pages.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Comment, Location, Post, User};

/// Public face of a user, safe to show next to their content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// A post joined with its author, category, location and comment count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCard {
    pub post: Post,
    pub author: Author,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}

/// A comment joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCard {
    pub comment: Comment,
    pub author: Author,
}
