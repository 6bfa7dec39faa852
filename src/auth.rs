//! Authenticated principal decoded from the identity provider's JWT.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::config::ServerConfig;
use crate::services::{ServiceError, ServiceResult};

/// Claims carried by the session token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub org_id: i32,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
    /// Display name of the organization, used when it is provisioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credentials")]
    MissingCredentials,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("server configuration is not registered")]
    MissingConfig,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingConfig => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

impl AuthenticatedUser {
    /// Decodes and validates an HS256 token.
    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, AuthError> {
        let data = decode::<AuthenticatedUser>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, AuthError> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or(AuthError::MissingConfig)?;

    let token = match bearer_token(req) {
        Some(token) => token,
        None => req
            .get_identity()
            .and_then(|identity| identity.id())
            .map_err(|_| AuthError::MissingCredentials)?,
    };

    AuthenticatedUser::from_jwt(&token, &config.secret)
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

/// Returns `true` when `role` is among `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if check_role(role, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(exp: usize) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-1".to_string(),
            email: "crew@example.com".to_string(),
            org_id: 7,
            name: "Crew Lead".to_string(),
            roles: vec!["claims".to_string()],
            exp,
            org_name: None,
        }
    }

    fn future_exp() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn token_round_trips_with_same_secret() {
        let original = user(future_exp());
        let token = original.to_jwt("secret").unwrap();
        let decoded = AuthenticatedUser::from_jwt(&token, "secret").unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn token_with_other_secret_is_rejected() {
        let token = user(future_exp()).to_jwt("secret").unwrap();
        assert!(matches!(
            AuthenticatedUser::from_jwt(&token, "other"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = user(1_000).to_jwt("secret").unwrap();
        assert!(AuthenticatedUser::from_jwt(&token, "secret").is_err());
    }

    #[test]
    fn ensure_role_requires_exact_match() {
        let u = user(0);
        assert!(ensure_role(&u, "claims").is_ok());
        assert!(matches!(
            ensure_role(&u, "claims_admin"),
            Err(ServiceError::Unauthorized)
        ));
    }
}
