//! Git operations for bot ingestion
//!
//! Clones remote bot repositories into the workspace so they can be
//! registered and launched like local ones.

mod operations;

pub use operations::{clone_repository, repo_name_from_url};
