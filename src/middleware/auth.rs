use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{Error, Result};
use crate::models::principal::{require, AdminPrincipal, ClientPrincipal, Principal, PrincipalKind};
use crate::AppState;

/// Reads the bearer token, if any. A header that is present but not a
/// bearer credential is rejected rather than ignored.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| Error::Unauthenticated("Malformed authorization header".into()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| Error::Unauthenticated("Unsupported authorization scheme".into()))
}

/// Resolves the session token into a [`Principal`] request extension.
/// Requests without a token pass through untouched for the guards to judge.
pub async fn resolve_principal(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match bearer_token(req.headers()) {
        Ok(token) => token.map(str::to_string),
        Err(e) => return e.into_response(),
    };
    let Some(token) = token else {
        return next.run(req).await;
    };

    match state.identity.authenticate(&token).await {
        Ok(principal) => {
            state.identity.spawn_touch(&principal);
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            e.into_response()
        }
    }
}

async fn guard(req: Request, next: Next, kind: PrincipalKind) -> Response {
    if let Err(e) = require(req.extensions().get::<Principal>(), kind) {
        return e.into_response();
    }
    next.run(req).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    guard(req, next, PrincipalKind::Admin).await
}

pub async fn require_client(req: Request, next: Next) -> Response {
    guard(req, next, PrincipalKind::Client).await
}

/// The authenticated admin for this request.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AdminPrincipal);

/// The authenticated client for this request.
#[derive(Debug, Clone)]
pub struct ClientUser(pub ClientPrincipal);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        match require(parts.extensions.get::<Principal>(), PrincipalKind::Admin)? {
            Principal::Admin(admin) => Ok(AdminUser(admin.clone())),
            Principal::Client(_) => Err(Error::Forbidden("Admin access required".into())),
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        match require(parts.extensions.get::<Principal>(), PrincipalKind::Client)? {
            Principal::Client(client) => Ok(ClientUser(client.clone())),
            Principal::Admin(_) => Err(Error::Forbidden("Client access required".into())),
        }
    }
}

impl From<AdminUser> for Principal {
    fn from(user: AdminUser) -> Self {
        Principal::Admin(user.0)
    }
}

impl From<ClientUser> for Principal {
    fn from(user: ClientUser) -> Self {
        Principal::Client(user.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_header_yields_no_token() {
        assert_eq!(bearer_token(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), Some("abc.def.ghi"));
    }

    #[test]
    fn other_schemes_are_unauthenticated() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(matches!(bearer_token(&headers), Err(Error::Unauthenticated(_))));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(matches!(bearer_token(&headers), Err(Error::Unauthenticated(_))));
    }
}
