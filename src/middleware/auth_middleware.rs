// Authentication middleware for protected routes
// Validates the bearer token, reloads the user and injects AuthenticatedUser
// into request extensions. Role checks run per route group afterwards.

use std::{future::Future, pin::Pin};

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{
    app::AppState,
    config::is_role_allowed,
    middleware::auth::AuthenticatedUser,
    models::user::{Rol, Usuario},
    schema::usuarios,
    utils::AuthError,
};

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(request_headers: &axum::http::HeaderMap) -> Option<&str> {
    let value = request_headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?;

    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Middleware function that validates JWT tokens and adds AuthenticatedUser to extensions
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Some(token) => token,
        None => return AuthError::MissingToken.into_response(),
    };

    let claims = match app_state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("JWT validation failed: {}", e);
            return AuthError::from(e).into_response();
        },
    };

    // The token alone is not enough: the account must still exist and be active
    let usuario = match load_active_user(&app_state, claims.id).await {
        Ok(usuario) => usuario,
        Err(e) => return e.into_response(),
    };

    if usuario.rol != claims.rol {
        tracing::debug!(
            user_id = %usuario.id,
            token_rol = %claims.rol,
            current_rol = %usuario.rol,
            "Role changed since token was issued, using current role"
        );
    }

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(&usuario));

    next.run(request).await
}

async fn load_active_user(app_state: &AppState, user_id: uuid::Uuid) -> Result<Usuario, AuthError> {
    let mut conn = app_state
        .diesel_pool
        .get()
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    let usuario = usuarios::table
        .find(user_id)
        .select(Usuario::as_select())
        .first::<Usuario>(&mut conn)
        .await
        .optional()
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    match usuario {
        Some(usuario) if usuario.activo => Ok(usuario),
        _ => Err(AuthError::AccountInactive),
    }
}

type MiddlewareFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Role gate for a route group, used with `axum::middleware::from_fn`.
/// Must run after `auth_middleware`. Admin always passes.
pub fn require_roles(
    allowed: &'static [Rol],
) -> impl Fn(Request<Body>, Next) -> MiddlewareFuture + Clone + Send + Sync + 'static {
    move |request: Request<Body>, next: Next| {
        Box::pin(async move {
            let rol = match request.extensions().get::<AuthenticatedUser>() {
                Some(user) => user.rol,
                None => return AuthError::MissingToken.into_response(),
            };

            if !is_role_allowed(rol, allowed) {
                tracing::debug!(rol = %rol, path = %request.uri().path(), "Role not allowed");
                return AuthError::Forbidden.into_response();
            }

            next.run(request).await
        })
    }
}

/// Extractor for AuthenticatedUser from request extensions
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
