use app::storage::Storage;

use crate::rate_limit::RateLimit;

pub struct RocketState {
    pub storage: Storage,
    /// Applied to login attempts, keyed by email.
    pub rate_limit: RateLimit,
}
