//! Domain entities - the core business objects.

mod category;
mod comment;
mod listing;
mod location;
mod post;
mod user;

pub use category::Category;
pub use comment::Comment;
pub use listing::{Author, CommentCard, PostCard};
pub use location::Location;
pub use post::{Post, PostDraft};
pub use user::User;
