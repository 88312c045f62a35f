use std::path::PathBuf;
use std::time::Duration;

use app::storage::{seed_development_data, Storage};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Config {
    data_dir: PathBuf,
    rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize)]
struct RateLimitConfig {
    limit: usize,
    span: Duration,
}

impl RateLimitConfig {
    fn into_rate_limit(self) -> api::RateLimit {
        api::RateLimit::new(self.limit, self.span)
    }
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let rocket = rocket::build();
    let config: Config = rocket.figment().extract()?;

    let storage = Storage::open(&config.data_dir).await?;
    log::info!("storage opened in {}", config.data_dir.display());
    #[cfg(debug_assertions)]
    {
        seed_development_data(&storage).await?;
        log::info!("development users are available");
    }

    log::info!(
        "login attempts limited to {} per {:?}",
        config.rate_limit.limit,
        config.rate_limit.span
    );
    api::register(rocket, storage, config.rate_limit.into_rate_limit())
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("server failed: {}", e))?;
    log::info!("server shut down");
    Ok(())
}
