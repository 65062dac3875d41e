//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blogicum-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory storage only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT sessions + Argon2 password hashing

pub mod clock;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

pub use clock::ManualClock;
pub use database::{DatabaseConfig, InMemoryStore};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
