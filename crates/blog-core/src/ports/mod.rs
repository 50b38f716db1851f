//! Ports - trait definitions for the persistence collaborator.
//! These are the "interfaces" that infrastructure must implement.

mod repository;

pub use repository::{AuthorRepository, BaseRepository, PostRepository};
