use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, routes::AppState};

use super::jwt::verify_access_token;

#[derive(Debug, Clone)]
pub struct AuthAccount {
    pub account_id: String,
}

impl AuthAccount {
    /// Tokens only grant access to their own account's resources.
    pub fn authorize(&self, account_id: &str) -> Result<(), AppError> {
        if self.account_id == account_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let claims = verify_access_token(token, &state.config.jwt_secret)?;

    request.extensions_mut().insert(AuthAccount {
        account_id: claims.sub,
    });

    Ok(next.run(request).await)
}
