//! Session handling. The session is a private (encrypted) cookie holding the user's email; it is
//! resolved against the stored user on every request.

use std::convert::Infallible;

use app::{auth, user};
use okapi::openapi3::{Object, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket::{
    async_trait,
    http::{Cookie, CookieJar, Status},
    request::{FromRequest, Outcome},
    Request,
};
use rocket_okapi::{
    gen::OpenApiGenerator,
    request::{OpenApiFromRequest, RequestHeaderInput},
};
use thiserror::Error;

use crate::state::RocketState;

pub const SESSION_COOKIE: &str = "usuario";

/// Only obtainable with a valid session.
pub struct SessionGuard(auth::SessionGrant);

impl SessionGuard {
    pub fn grant(&self) -> &auth::SessionGrant {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("access denied")]
    AccessDenied(#[from] auth::AccessDenied),
    #[error("session could not be resolved")]
    Unavailable,
}

#[async_trait]
impl<'r> FromRequest<'r> for SessionGuard {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let cookies = req.cookies();
        let email = match cookies.get_private(SESSION_COOKIE) {
            Some(cookie) => user::Email(cookie.value().to_owned()),
            None => return Outcome::Error((Status::Unauthorized, auth::AccessDenied.into())),
        };
        let state = match req.rocket().state::<RocketState>() {
            Some(state) => state,
            None => return Outcome::Error((Status::InternalServerError, Error::Unavailable)),
        };
        match auth::resolve(&state.storage, email).await {
            Ok(grant) => Outcome::Success(Self(grant)),
            Err(auth::Error::AccessDenied(e)) => {
                log::info!("dropping session of unknown user");
                cookies.remove_private(SESSION_COOKIE);
                Outcome::Error((Status::Unauthorized, e.into()))
            }
            Err(e) => {
                log::error!("failed to resolve session: {}", e);
                Outcome::Error((Status::InternalServerError, Error::Unavailable))
            }
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for SessionGuard {
    fn from_request_input(
        _: &mut OpenApiGenerator,
        _: String,
        _: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(openapi_session())
    }
}

/// Starts and ends sessions.
pub struct SessionCookies<'r>(&'r CookieJar<'r>);

impl SessionCookies<'_> {
    pub fn start(&self, grant: &auth::SessionGrant) {
        self.0
            .add_private(Cookie::new(SESSION_COOKIE, grant.email.0.clone()));
    }

    /// Does nothing if there is no session.
    pub fn end(&self) {
        self.0.remove_private(SESSION_COOKIE);
    }
}

#[async_trait]
impl<'r> FromRequest<'r> for SessionCookies<'r> {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(Self(req.cookies()))
    }
}

impl<'a> OpenApiFromRequest<'a> for SessionCookies<'a> {
    fn from_request_input(
        _: &mut OpenApiGenerator,
        _: String,
        _: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

fn openapi_session() -> RequestHeaderInput {
    let security_scheme = SecurityScheme {
        description: Some(format!(
            "Requires a session cookie \"{}\", set by logging in or registering.",
            SESSION_COOKIE
        )),
        data: SecuritySchemeData::ApiKey {
            name: SESSION_COOKIE.to_owned(),
            location: "cookie".to_owned(),
        },
        extensions: Object::default(),
    };
    let mut security_req = SecurityRequirement::new();
    security_req.insert(SESSION_COOKIE.to_owned(), Vec::new());
    RequestHeaderInput::Security(SESSION_COOKIE.to_owned(), security_scheme, security_req)
}
