use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// Extracts the authenticated user from request extensions.
///
/// Intended for routes behind `AuthMiddleware`, which validates the bearer
/// token, resolves it to a user record, and inserts that record into the
/// extensions. If no user is present the middleware did not run for this
/// route; answering 401 is the safe default.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(CurrentUser(user))),
            None => {
                let err = AppError::Unauthenticated(
                    "no authenticated user in request extensions".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
