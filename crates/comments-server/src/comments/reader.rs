use chrono::{DateTime, Utc};
use comments_shared::Comment;
use mongodb::bson::Document;

use crate::error::AppError;

use super::repository::{id_to_string, CommentRepository};
use super::{CommentScope, ListCommentsParams};

fn timestamp(doc: &Document, key: &str) -> DateTime<Utc> {
    doc.get_datetime(key)
        .ok()
        .and_then(|at| DateTime::<Utc>::from_timestamp_millis(at.timestamp_millis()))
        .unwrap_or_else(Utc::now)
}

fn string_field(doc: &Document, key: &str) -> String {
    doc.get_str(key).unwrap_or_default().to_string()
}

/// Maps a stored document to a [`Comment`]. Legacy documents without
/// timestamps get the current time.
pub(crate) fn to_domain(doc: Document) -> Comment {
    Comment {
        id: doc.get("_id").map(id_to_string).unwrap_or_default(),
        account_id: string_field(&doc, "account_id"),
        task_id: string_field(&doc, "task_id"),
        author: string_field(&doc, "author"),
        body: string_field(&doc, "body"),
        created_at: timestamp(&doc, "created_at"),
        updated_at: timestamp(&doc, "updated_at"),
    }
}

/// `(skip, limit)` for the requested page, `(0, 0)` when pagination is off.
fn page_window(page: Option<u32>, size: Option<u32>) -> (u64, u64) {
    match (page, size) {
        (Some(page), Some(size)) if page > 0 && size > 0 => {
            let size = u64::from(size);
            ((u64::from(page) - 1) * size, size)
        }
        _ => (0, 0),
    }
}

pub(crate) async fn list(
    repo: &CommentRepository,
    params: &ListCommentsParams,
) -> Result<Vec<Comment>, AppError> {
    let (skip, limit) = page_window(params.page, params.size);
    let docs = repo.find_by_task(&params.scope, skip, limit).await?;
    Ok(docs.into_iter().map(to_domain).collect())
}

pub(crate) async fn get_by_id(
    repo: &CommentRepository,
    scope: &CommentScope,
    comment_id: &str,
) -> Result<Option<Comment>, AppError> {
    let doc = repo.find_one(comment_id, scope).await?;
    Ok(doc.map(to_domain))
}
