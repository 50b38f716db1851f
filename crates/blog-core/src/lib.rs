//! # Blog Core
//!
//! The domain layer of the blog API.
//! This crate contains the post/author model and the repository ports,
//! with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
