//! The authentication gate.
//!
//! Wrapped around the `/api` scope. For every request outside the public
//! paths it walks the full chain: bearer header present -> token
//! cryptographically valid and unexpired -> subject resolves to an
//! existing user. Each step failing collapses into the same 401 response;
//! a caller cannot tell a bad signature from a deleted account. On success
//! the resolved `User` is stored in request extensions for the
//! [`CurrentUser`](crate::auth::extractors::CurrentUser) extractor.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::token::verify_token;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Paths reachable without credentials. Registration and login have to be,
/// the health probe stays outside the `/api` scope anyway.
fn is_public(path: &str) -> bool {
    path == "/health"
        || path.starts_with("/api/auth/login")
        || path.starts_with("/api/auth/register")
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            match resolve_user(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert::<User>(user);
                    Ok(service.call(req).await?.map_into_left_body())
                }
                Err(error) => {
                    let response = error.error_response().map_into_right_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

/// Runs the gate against a request: header, token, user lookup.
async fn resolve_user(req: &ServiceRequest) -> Result<User, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state is not configured".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("missing bearer token".into()))?;

    let claims = verify_token(token, &state.auth)?;

    // A syntactically valid, unexpired token may still reference an
    // account that no longer exists; that is the same 401 as any other
    // failure.
    state
        .users
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("token subject does not resolve".into()))
}
