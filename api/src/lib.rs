//! This library contains definitions for the API layer.

use app::storage::Storage;
use rocket::{Build, Rocket};
use state::RocketState;

mod access;
mod error;
mod rate_limit;
mod routes;
mod state;

pub use access::SESSION_COOKIE;
pub use rate_limit::RateLimit;

pub fn register(rocket: Rocket<Build>, storage: Storage, rate_limit: RateLimit) -> Rocket<Build> {
    routes::register(
        rocket,
        RocketState {
            storage,
            rate_limit,
        },
    )
}
