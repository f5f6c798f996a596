//! aperture entry point
//! Warm a portfolio's assets from the command line

use aperture_catalog::{CacheConfig, CatalogCache};
use aperture_pipeline::{HttpAssetFetcher, JsonManifestSource, PreloadConfig, PreloadCoordinator};
use clap::{value_parser, Arg, Command};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Command::new("aperture")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Photography-portfolio asset delivery pipeline")
        .arg(
            Arg::new("manifest")
                .long("manifest")
                .required(true)
                .help("URL of the catalog JSON manifest"),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .default_value("10")
                .value_parser(value_parser!(usize))
                .help("Preload attempts issued concurrently per batch"),
        )
        .arg(
            Arg::new("batch-delay-ms")
                .long("batch-delay-ms")
                .default_value("100")
                .value_parser(value_parser!(u64))
                .help("Delay between consecutive batches in milliseconds"),
        )
        .arg(
            Arg::new("ttl-secs")
                .long("ttl-secs")
                .default_value("300")
                .value_parser(value_parser!(u64))
                .help("Catalog cache entry lifetime in seconds"),
        );

    let matches = cli.get_matches();
    let manifest = matches
        .get_one::<String>("manifest")
        .expect("manifest is required")
        .clone();
    let batch_size = *matches.get_one::<usize>("batch-size").expect("has default");
    let batch_delay = Duration::from_millis(
        *matches
            .get_one::<u64>("batch-delay-ms")
            .expect("has default"),
    );
    let ttl = Duration::from_secs(*matches.get_one::<u64>("ttl-secs").expect("has default"));

    let source = JsonManifestSource::new(manifest);
    let cache = Arc::new(CatalogCache::with_config(
        source,
        CacheConfig::new().with_ttl(ttl),
    ));
    let fetcher = Arc::new(HttpAssetFetcher::new());
    let coordinator = PreloadCoordinator::with_config(
        Arc::clone(&cache),
        fetcher,
        PreloadConfig::new()
            .with_batch_size(batch_size)
            .with_batch_delay(batch_delay),
    );

    let mut progress = coordinator.subscribe();
    let reporter = tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let snapshot = *progress.borrow_and_update();
            info!("loading portfolio images... {}%", snapshot.percent);
            if !snapshot.preloading && snapshot.percent == 100 {
                break;
            }
        }
    });

    coordinator.start().await;
    let _ = reporter.await;

    let categories = cache.categories().await?;
    info!(
        "catalog ready: {} categories, {} assets warmed, {} failed",
        categories.len(),
        coordinator.loaded_count(),
        coordinator.failed_count()
    );

    for url in coordinator.failed_urls() {
        info!("failed to warm: {}", url);
    }

    Ok(())
}
