//! Add top-level routes as submodules here.

use crate::{error, state::RocketState};
use rocket::{catch, catchers, routes, serde::json::Json, Build, Rocket};
use rocket_okapi::{
    openapi_get_routes,
    swagger_ui::{make_swagger_ui, SwaggerUIConfig},
};

mod data;
mod pages;
mod session;

pub fn register(rocket: Rocket<Build>, state: RocketState) -> Rocket<Build> {
    let rocket = rocket
        .manage(state)
        .register("/", catchers![unauthorized, internal_error])
        .mount("/", routes![pages::welcome, pages::panel, pages::logout])
        .mount(
            "/",
            openapi_get_routes![session::login, session::register, data::get, data::post],
        );
    mount_swagger(rocket)
}

pub fn mount_swagger(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        "/swagger",
        make_swagger_ui(&SwaggerUIConfig {
            url: "../openapi.json".to_owned(),
            ..Default::default()
        }),
    )
}

/// Any request that needed a session and didn't have one.
#[catch(401)]
fn unauthorized() -> Json<error::Message> {
    error::Message::new(error::UNAUTHORIZED)
}

#[catch(500)]
fn internal_error() -> Json<error::Message> {
    error::Message::new(error::INTERNAL_ERROR)
}
