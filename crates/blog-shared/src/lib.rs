//! # Blog Shared
//!
//! Wire types for the blog API: request bodies, the serialized
//! representation of posts and authors, and request-body validation.

pub mod dto;
pub mod response;
pub mod validation;

pub use response::ErrorResponse;
pub use validation::missing_field;
