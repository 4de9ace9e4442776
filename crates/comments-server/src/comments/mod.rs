//! The comment resource: storage mapping, reader/writer and the service
//! functions the HTTP handlers call.

mod reader;
mod repository;
pub mod service;
mod types;
mod writer;

pub use repository::{comment_schema, CommentRepository, COLLECTION_NAME};
pub use types::*;
