//! Optional bearer-token authentication for the `/pow/*` routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{authorization::Bearer, Authorization};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, info};

use super::response::ApiError;
use super::AppState;
use crate::config::AuthConfig;
use crate::TARGET_WEB_REQUEST;

/// Claims a caller's token must carry.
#[derive(Debug, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
}

/// HS256 validator built from the configured secret.
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
    allowed_issuers: Vec<String>,
}

impl JwtValidator {
    /// `None` when no secret is configured, which leaves the API open.
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        let secret = config.secret.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present but not required.
        validation.required_spec_claims.clear();
        Some(JwtValidator {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            allowed_issuers: config.allowed_issuers.clone(),
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, &'static str> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => "Token has expired.",
                _ => "Invalid token.",
            })?
            .claims;

        if claims.email.as_deref().map_or(true, str::is_empty) {
            return Err("Invalid token: missing email.");
        }
        let Some(issuer) = claims.iss.as_deref().filter(|i| !i.is_empty()) else {
            return Err("Invalid token: missing issuer.");
        };
        if !self.allowed_issuers.is_empty() && !self.allowed_issuers.iter().any(|i| i == issuer) {
            return Err("Invalid token: issuer not allowed.");
        }
        Ok(claims)
    }
}

/// Middleware rejecting requests without a valid bearer token, when enabled.
pub async fn require_bearer(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(validator) = state.auth.as_deref() else {
        return Ok(next.run(request).await);
    };

    let Some(TypedHeader(bearer)) = bearer else {
        debug!(target: TARGET_WEB_REQUEST, "Missing bearer token for {}", request.uri().path());
        return Err(ApiError::Unauthorized("Authorization token is missing"));
    };

    match validator.validate(bearer.token()) {
        Ok(claims) => {
            debug!(
                target: TARGET_WEB_REQUEST,
                "Authenticated {} for {}",
                claims.email.as_deref().unwrap_or_default(),
                request.uri().path()
            );
            Ok(next.run(request).await)
        }
        Err(reason) => {
            info!(target: TARGET_WEB_REQUEST, "Rejected token for {}: {}", request.uri().path(), reason);
            Err(ApiError::Unauthorized(reason))
        }
    }
}
