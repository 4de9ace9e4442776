use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Account ID
    pub exp: i64,    // Expiration timestamp
    pub iat: i64,    // Issued at timestamp
}

pub fn create_access_token(
    account_id: &str,
    secret: &str,
    expires_in_secs: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expires_in_secs);

    let claims = Claims {
        sub: account_id.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        AppError::Unauthorized
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_its_own_tokens() {
        let token = create_access_token("acc1", "secret", 60).unwrap();
        let claims = verify_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "acc1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = create_access_token("acc1", "secret", 60).unwrap();
        assert!(matches!(
            verify_access_token(&token, "other"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_expired_tokens() {
        // Past the default 60s leeway.
        let token = create_access_token("acc1", "secret", -300).unwrap();
        assert!(matches!(
            verify_access_token(&token, "secret"),
            Err(AppError::Unauthorized)
        ));
    }
}
