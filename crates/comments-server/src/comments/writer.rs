use chrono::Utc;
use comments_shared::Comment;
use mongodb::bson::{doc, Document};

use crate::error::AppError;

use super::reader::to_domain;
use super::repository::{to_bson_datetime, CommentRepository};
use super::{CommentScope, CreateCommentParams, UpdateCommentParams, UpdateOutcome};

pub(crate) async fn create(
    repo: &CommentRepository,
    params: CreateCommentParams,
) -> Result<Comment, AppError> {
    let now = to_bson_datetime(Utc::now());
    let doc = doc! {
        "account_id": params.scope.account_id.as_str(),
        "task_id": params.scope.task_id.as_str(),
        "author": params.author,
        "body": params.body,
        "created_at": now,
        "updated_at": now,
    };

    let id = repo.insert(doc).await?;

    // Read back the stored form so the response matches what later reads return.
    let saved = repo
        .find_one(&id, &params.scope)
        .await?
        .ok_or_else(|| AppError::BadRequest("Failed to save comment".to_string()))?;

    tracing::debug!("Created comment {} on task {}", id, params.scope.task_id);
    Ok(to_domain(saved))
}

fn changed_fields(params: &UpdateCommentParams) -> Document {
    let mut fields = Document::new();
    if let Some(author) = &params.author {
        fields.insert("author", author.as_str());
    }
    if let Some(body) = &params.body {
        fields.insert("body", body.as_str());
    }
    fields
}

pub(crate) async fn update(
    repo: &CommentRepository,
    params: UpdateCommentParams,
) -> Result<UpdateOutcome, AppError> {
    let fields = changed_fields(&params);
    if fields.is_empty() {
        return Ok(UpdateOutcome::Unchanged);
    }

    let updated = repo
        .update_one(&params.comment_id, &params.scope, fields)
        .await?;

    Ok(match updated {
        Some(doc) => UpdateOutcome::Updated(to_domain(doc)),
        None => UpdateOutcome::NotFound,
    })
}

pub(crate) async fn delete(
    repo: &CommentRepository,
    scope: &CommentScope,
    comment_id: &str,
) -> Result<bool, AppError> {
    Ok(repo.delete_one(comment_id, scope).await?)
}
