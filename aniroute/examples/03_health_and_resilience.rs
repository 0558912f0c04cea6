mod common;
use std::time::Duration;

use aniroute::{HealthConfig, SourceManager};
use common::{get_sources, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut builder = SourceManager::builder().health(HealthConfig {
        interval: Duration::from_secs(1),
        ..HealthConfig::default()
    });
    for source in get_sources() {
        builder = builder.with_source(source);
    }
    let manager = builder.build()?;
    let monitor = manager.spawn_health_monitor();

    // Ids containing FAIL make the mock sources error, tripping failover.
    let missing = manager.get_anime("FAIL-1").await;
    println!("lookup of a failing id: {missing:?}");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let report = manager.resilience_report();
    println!("{}", serde_json::to_string_pretty(&report)?);

    manager.shutdown();
    monitor.await?;
    Ok(())
}
