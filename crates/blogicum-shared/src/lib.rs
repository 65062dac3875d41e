//! # Blogicum Shared
//!
//! Serializable page contexts and error bodies exchanged with clients.
//! This crate has no dependency on the domain layer; handlers map domain
//! values into these views.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
