use comments_shared::Comment;

use crate::error::AppError;

/// The `(account_id, task_id)` pair every comment belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentScope {
    pub account_id: String,
    pub task_id: String,
}

impl CommentScope {
    pub fn new(account_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            task_id: task_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListCommentsParams {
    pub scope: CommentScope,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub scope: CommentScope,
    pub author: String,
    pub body: String,
}

impl CreateCommentParams {
    /// Both fields must be present and non-blank.
    pub fn new(
        scope: CommentScope,
        author: Option<String>,
        body: Option<String>,
    ) -> Result<Self, AppError> {
        match (author, body) {
            (Some(author), Some(body)) if !author.trim().is_empty() && !body.trim().is_empty() => {
                Ok(Self {
                    scope,
                    author,
                    body,
                })
            }
            _ => Err(AppError::BadRequest(
                "author and body are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpdateCommentParams {
    pub scope: CommentScope,
    pub comment_id: String,
    pub author: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Comment),
    /// No mutable field was supplied; the store was not touched.
    Unchanged,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Some("hello"))]
    #[case(Some("Bob"), None)]
    #[case(Some(""), Some("hello"))]
    #[case(Some("Bob"), Some("   "))]
    #[case(None, None)]
    fn create_params_require_author_and_body(
        #[case] author: Option<&str>,
        #[case] body: Option<&str>,
    ) {
        let result = CreateCommentParams::new(
            CommentScope::new("acc1", "t1"),
            author.map(str::to_string),
            body.map(str::to_string),
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn create_params_keep_values() {
        let params = CreateCommentParams::new(
            CommentScope::new("acc1", "t1"),
            Some("Bob".into()),
            Some("hello".into()),
        )
        .unwrap();
        assert_eq!(params.author, "Bob");
        assert_eq!(params.body, "hello");
        assert_eq!(params.scope, CommentScope::new("acc1", "t1"));
    }
}
