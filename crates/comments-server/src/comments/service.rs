//! Entry points used by the HTTP layer. Each function only delegates to the
//! reader or writer.

use comments_shared::Comment;

use crate::error::AppError;

use super::{
    reader, writer, CommentRepository, CommentScope, CreateCommentParams, ListCommentsParams,
    UpdateCommentParams, UpdateOutcome,
};

pub async fn list_comments(
    repo: &CommentRepository,
    params: &ListCommentsParams,
) -> Result<Vec<Comment>, AppError> {
    reader::list(repo, params).await
}

pub async fn get_comment(
    repo: &CommentRepository,
    scope: &CommentScope,
    comment_id: &str,
) -> Result<Option<Comment>, AppError> {
    reader::get_by_id(repo, scope, comment_id).await
}

pub async fn create_comment(
    repo: &CommentRepository,
    params: CreateCommentParams,
) -> Result<Comment, AppError> {
    writer::create(repo, params).await
}

pub async fn update_comment(
    repo: &CommentRepository,
    params: UpdateCommentParams,
) -> Result<UpdateOutcome, AppError> {
    writer::update(repo, params).await
}

pub async fn delete_comment(
    repo: &CommentRepository,
    scope: &CommentScope,
    comment_id: &str,
) -> Result<bool, AppError> {
    writer::delete(repo, scope, comment_id).await
}
