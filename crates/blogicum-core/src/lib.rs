//! # Blogicum Core
//!
//! The domain layer of Blogicum.
//! This crate contains the blog's business rules (visibility, pagination,
//! form validation) with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod visibility;

pub use error::RepoError;
pub use pagination::{Page, PageInfo, Paginator};
pub use visibility::Visibility;
