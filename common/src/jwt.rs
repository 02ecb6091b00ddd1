use actix_web::{HttpMessage, HttpResponse, dev::ServiceRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    env_config::JwtConfig,
    error::{AppError, Res},
};

/// Claims carried by identity-provider access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    /// User id.
    pub sub: Uuid,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

impl JwtClaims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
}

/// Signs a token the same way the identity provider does.
/// Used by operators for smoke tests and by the integration tests.
pub fn issue_jwt(user_id: Uuid, lifetime: Duration, config: &JwtConfig) -> Res<String> {
    let expiration = Utc::now()
        .checked_add_signed(lifetime)
        .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?
        .timestamp();

    let claims = JwtClaims {
        sub: user_id,
        aud: config.audience.clone(),
        exp: expiration.max(0) as usize,
        email: None,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AppError::from)
}

/// Verifies signature, expiry and audience, then returns the claims.
pub fn validate_jwt(token: &str, config: &JwtConfig) -> Res<JwtClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);

    let token_data = jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

pub fn get_jwt_claims_or_error(req: &ServiceRequest) -> Result<JwtClaims, HttpResponse> {
    if let Some(jwt_claims_res) = req.extensions().get::<Res<JwtClaims>>() {
        match jwt_claims_res {
            Ok(claims) => Ok(claims.clone()),
            Err(app_error) => Err(app_error.to_http_response()),
        }
    } else {
        Err(
            AppError::Unauthorized("Missing authorization header".to_string())
                .to_http_response(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            audience: "authenticated".to_string(),
        }
    }

    #[test]
    fn issued_tokens_validate() {
        let user_id = Uuid::new_v4();
        let token = issue_jwt(user_id, Duration::minutes(5), &config()).unwrap();
        let claims = validate_jwt(&token, &config()).unwrap();
        assert_eq!(claims.user_id(), user_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_jwt(Uuid::new_v4(), Duration::minutes(5), &config()).unwrap();
        let other = JwtConfig {
            secret: "another-secret".to_string(),
            ..config()
        };
        assert!(validate_jwt(&token, &other).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let token = issue_jwt(Uuid::new_v4(), Duration::minutes(5), &config()).unwrap();
        let other = JwtConfig {
            audience: "service_role".to_string(),
            ..config()
        };
        assert!(validate_jwt(&token, &other).is_err());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue_jwt(Uuid::new_v4(), Duration::minutes(-10), &config()).unwrap();
        assert!(validate_jwt(&token, &config()).is_err());
    }
}
