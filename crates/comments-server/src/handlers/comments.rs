use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use comments_shared::{
    api::{CommentListParams, CreateCommentRequest, MessageResponse, UpdateCommentRequest},
    Comment,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::auth::AuthAccount;
use crate::comments::{
    service, CommentScope, CreateCommentParams, ListCommentsParams, UpdateCommentParams,
    UpdateOutcome,
};
use crate::error::AppError;
use crate::routes::AppState;

/// Parses a request body as a JSON object. An empty body is an empty object.
fn json_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(AppError::BadRequest(format!("Invalid JSON body: {}", e))),
    }
}

fn from_object<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(map))
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}

fn authorized_scope(
    auth: &AuthAccount,
    account_id: String,
    task_id: String,
) -> Result<CommentScope, AppError> {
    auth.authorize(&account_id)?;
    Ok(CommentScope::new(account_id, task_id))
}

/// GET /api/v1/accounts/:account_id/tasks/:task_id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path((account_id, task_id)): Path<(String, String)>,
    Query(query): Query<CommentListParams>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let scope = authorized_scope(&auth, account_id, task_id)?;

    if query.page == Some(0) || query.size == Some(0) {
        return Err(AppError::BadRequest(
            "page and size must be positive integers".to_string(),
        ));
    }

    let params = ListCommentsParams {
        scope,
        page: query.page,
        size: query.size,
    };
    let comments = service::list_comments(&state.comments, &params).await?;
    Ok(Json(comments))
}

/// GET /api/v1/accounts/:account_id/tasks/:task_id/comments/:comment_id
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path((account_id, task_id, comment_id)): Path<(String, String, String)>,
) -> Result<Json<Comment>, AppError> {
    let scope = authorized_scope(&auth, account_id, task_id)?;

    let comment = service::get_comment(&state.comments, &scope, &comment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(comment))
}

/// POST /api/v1/accounts/:account_id/tasks/:task_id/comments
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path((account_id, task_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let scope = authorized_scope(&auth, account_id, task_id)?;

    let req: CreateCommentRequest = from_object(json_object(&body)?)?;
    let params = CreateCommentParams::new(scope, req.author, req.body)?;

    let comment = service::create_comment(&state.comments, params).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// PATCH /api/v1/accounts/:account_id/tasks/:task_id/comments/:comment_id
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path((account_id, task_id, comment_id)): Path<(String, String, String)>,
    body: Bytes,
) -> Result<Json<Comment>, AppError> {
    let scope = authorized_scope(&auth, account_id, task_id)?;

    let payload = json_object(&body)?;
    if payload.is_empty() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }
    let req: UpdateCommentRequest = from_object(payload)?;

    let params = UpdateCommentParams {
        scope,
        comment_id,
        author: req.author,
        body: req.body,
    };

    match service::update_comment(&state.comments, params).await? {
        UpdateOutcome::Updated(comment) => Ok(Json(comment)),
        // Nothing recognized to write means no document was updated.
        UpdateOutcome::NotFound | UpdateOutcome::Unchanged => Err(AppError::NotFound),
    }
}

/// DELETE /api/v1/accounts/:account_id/tasks/:task_id/comments/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAccount>,
    Path((account_id, task_id, comment_id)): Path<(String, String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let scope = authorized_scope(&auth, account_id, task_id)?;

    if !service::delete_comment(&state.comments, &scope, &comment_id).await? {
        return Err(AppError::NotFound);
    }

    Ok(Json(MessageResponse {
        message: "deleted".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_empty_object() {
        assert!(json_object(b"").unwrap().is_empty());
        assert!(json_object(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_objects_and_malformed_json() {
        assert!(matches!(json_object(b"[1, 2]"), Err(AppError::BadRequest(_))));
        assert!(matches!(json_object(b"{\"author\":"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn mistyped_fields_are_bad_requests() {
        let map = json_object(br#"{"author": 5, "body": "x"}"#).unwrap();
        let result: Result<CreateCommentRequest, _> = from_object(map);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
