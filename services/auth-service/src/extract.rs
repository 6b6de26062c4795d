use crate::error::ApiError;
use crate::state::AppState;
use af_auth_core::{SessionClaims, SessionError};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// Claims from a valid investor bearer token.
pub(crate) struct AuthInvestor(pub(crate) SessionClaims);

/// Claims from a valid farmer bearer token.
pub(crate) struct AuthFarmer(pub(crate) SessionClaims);

/// Claims from a valid admin bearer token.
pub(crate) struct AuthAdmin(pub(crate) SessionClaims);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authorization header is required"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must use the Bearer scheme"))?;

    if token.trim().is_empty() {
        return Err(ApiError::unauthorized("Bearer token is empty"));
    }
    Ok(token)
}

fn token_error(err: SessionError) -> ApiError {
    match err {
        SessionError::Expired => ApiError::unauthorized("Token has expired"),
        _ => ApiError::unauthorized("Invalid token"),
    }
}

impl FromRequestParts<AppState> for AuthInvestor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.auth.sessions().parse(token).map_err(token_error)?;
        if claims.role != "investor" {
            return Err(ApiError::unauthorized("Invalid token"));
        }
        Ok(Self(claims))
    }
}

impl FromRequestParts<AppState> for AuthFarmer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.auth.sessions().parse(token).map_err(token_error)?;
        if claims.role != "farmer" {
            return Err(ApiError::unauthorized("Invalid token"));
        }
        Ok(Self(claims))
    }
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state
            .auth
            .sessions()
            .parse_admin(token)
            .map_err(token_error)?;
        Ok(Self(claims))
    }
}
