use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use odsadmin_api::setup::{initialize_app, server::start_server};
use odsadmin_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let (_state, app) = initialize_app(config.clone()).await?;

    start_server(&config, app).await?;

    Ok(())
}
