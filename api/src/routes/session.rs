//! Routes for logging in and registering. Both start a session on success.

use rocket::{post, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use app::auth;

use crate::error::{self, Ack, JsonError, JsonResult};
use crate::{access, state::RocketState};

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct LoginRequest {
    /// Registered email, matched exactly.
    #[serde(rename = "correo", default)]
    email: String,
    #[serde(rename = "contraseña", default)]
    password: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct RegisterRequest {
    /// Display name.
    #[serde(rename = "nombre", default)]
    name: String,
    /// Email to register. Must not be registered already.
    #[serde(rename = "correo", default)]
    email: String,
    #[serde(rename = "contraseña", default)]
    password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum Error {
    /// Unexpected error, please try again later.
    Unknown,
    /// One of the fields is empty.
    MissingField,
    /// The email is already registered.
    DuplicateEmail,
    /// The email is not registered.
    UnknownEmail,
    /// The password does not match.
    WrongPassword,
    /// Too many login attempts for this email.
    RateLimited,
}

/// Log in with email and password.
#[openapi(tag = "Session")]
#[post("/login", data = "<req>")]
pub(super) async fn login(
    state: &State<RocketState>,
    cookies: access::SessionCookies<'_>,
    req: Json<LoginRequest>,
) -> JsonResult<Ack, Error> {
    if state.rate_limit.limit(&req.email) {
        log::warn!("rate limiting logins for {:?}", req.email);
        return Err(error::too_many_requests(
            Error::RateLimited,
            "Demasiados intentos, inténtelo más tarde",
        ));
    }
    let grant = auth::login(&state.storage, &req.email, &req.password)
        .await
        .map_err(auth_error)?;
    cookies.start(&grant);
    Ok(Ack::ok())
}

/// Create an account. The new user is logged in straight away.
#[openapi(tag = "Session")]
#[post("/registro", data = "<req>")]
pub(super) async fn register(
    state: &State<RocketState>,
    cookies: access::SessionCookies<'_>,
    req: Json<RegisterRequest>,
) -> JsonResult<Ack, Error> {
    let grant = auth::register(&state.storage, &req.name, &req.email, &req.password)
        .await
        .map_err(auth_error)?;
    cookies.start(&grant);
    Ok(Ack::ok())
}

fn auth_error(e: auth::Error) -> JsonError<Error> {
    match e {
        auth::Error::MissingField => {
            error::bad_request(Error::MissingField, "Rellene todos los campos")
        }
        auth::Error::DuplicateEmail => {
            error::conflict(Error::DuplicateEmail, "Ese correo ya está registrado")
        }
        auth::Error::UnknownEmail => {
            error::unauthorized(Error::UnknownEmail, "Correo no registrado")
        }
        auth::Error::WrongPassword => {
            error::unauthorized(Error::WrongPassword, "Contraseña incorrecta")
        }
        e @ (auth::Error::AccessDenied(_) | auth::Error::Hashing(_) | auth::Error::Storage(_)) => {
            error::internal_server_error(Error::Unknown, &e)
        }
    }
}
