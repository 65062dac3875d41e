//! Publication visibility rules.
//!
//! A post is publicly visible when it is published, its category (if it has
//! one) is published, and its publication date is not in the future. Every
//! public listing goes through this rule; storage backends translate
//! [`Visibility`] into their own query language.

use chrono::{DateTime, Utc};

use crate::domain::{Category, Post, PostCard};

/// Which posts a listing is allowed to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// The full public rule.
    Published { now: DateTime<Utc> },
    /// Only the date check: anything already dated, published or not.
    Dated { now: DateTime<Utc> },
    /// No restriction.
    Everything,
}

impl Visibility {
    pub fn published(now: DateTime<Utc>) -> Self {
        Self::Published { now }
    }

    /// Scope for a profile page: owners see everything, visitors see dated posts.
    pub fn for_profile(is_owner: bool, now: DateTime<Utc>) -> Self {
        if is_owner {
            Self::Everything
        } else {
            Self::Dated { now }
        }
    }

    /// Whether `post` (with its resolved `category`) passes this scope.
    pub fn admits(&self, post: &Post, category: Option<&Category>) -> bool {
        match *self {
            Self::Published { now } => is_publicly_visible(post, category, now),
            Self::Dated { now } => post.pub_date <= now,
            Self::Everything => true,
        }
    }
}

/// The public visibility predicate.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && category.is_none_or(|c| c.is_published) && post.pub_date <= now
}

/// Keep only publicly visible cards, preserving their order.
pub fn filter_published(mut cards: Vec<PostCard>, now: DateTime<Utc>) -> Vec<PostCard> {
    cards.retain(|card| is_publicly_visible(&card.post, card.category.as_ref(), now));
    cards
}
