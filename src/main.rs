use chrono::Local;
use fbref_harvest::{
    config::HarvestConfig, info_time, logging::init_logging, process::Harvester,
    request::Fetcher, tables::TABLE_SPECS, Result,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let start_time = Local::now();

    let config = HarvestConfig::default();
    let fetcher = Fetcher::new(&config)?;
    tracing::info!(
        "Session user agent: {}",
        fetcher.user_agent().unwrap_or("<reqwest default>")
    );
    let harvester = Harvester::new(config, TABLE_SPECS, fetcher);
    harvester.run().await?;

    info_time!(start_time, "Full program time:");
    Ok(())
}
