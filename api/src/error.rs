use rocket::{http::Status, serde::json::Json};
use schemars::JsonSchema;
use serde::Serialize;

/// Body of every successful mutation.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Ack {
    /// Always true.
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Failure<E: Serialize> {
    /// Always false.
    pub ok: bool,
    /// Message meant to be shown to the user as-is.
    pub error: String,
    pub code: E,
}

/// Bare error body of the data routes and the catchers.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message {
    pub error: String,
}

impl Message {
    pub fn new(error: &str) -> Json<Self> {
        Json(Self {
            error: error.to_owned(),
        })
    }
}

pub const UNAUTHORIZED: &str = "No autorizado";
pub const INTERNAL_ERROR: &str = "Error interno";

pub type JsonError<E> = (Status, Json<Failure<E>>);

pub type JsonResult<T, E> = Result<Json<T>, JsonError<E>>;

pub type MessageError = (Status, Json<Message>);

pub type MessageResult<T> = Result<Json<T>, MessageError>;

fn failure<E: Serialize>(status: Status, code: E, error: &str) -> JsonError<E> {
    (
        status,
        Json(Failure {
            ok: false,
            error: error.to_owned(),
            code,
        }),
    )
}

pub fn bad_request<E: Serialize>(code: E, error: &str) -> JsonError<E> {
    failure(Status::BadRequest, code, error)
}

pub fn unauthorized<E: Serialize>(code: E, error: &str) -> JsonError<E> {
    failure(Status::Unauthorized, code, error)
}

pub fn conflict<E: Serialize>(code: E, error: &str) -> JsonError<E> {
    failure(Status::Conflict, code, error)
}

pub fn too_many_requests<E: Serialize>(code: E, error: &str) -> JsonError<E> {
    failure(Status::TooManyRequests, code, error)
}

pub fn internal_server_error<E: Serialize>(code: E, cause: &dyn std::error::Error) -> JsonError<E> {
    log::error!("request failed: {}", cause);
    failure(Status::InternalServerError, code, INTERNAL_ERROR)
}

pub fn message(status: Status, error: &str) -> MessageError {
    (status, Message::new(error))
}

pub fn internal_error_message(cause: &dyn std::error::Error) -> MessageError {
    log::error!("request failed: {}", cause);
    message(Status::InternalServerError, INTERNAL_ERROR)
}
