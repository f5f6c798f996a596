use aperture_catalog::CatalogCache;
use aperture_pipeline::{AssetFetcher, PreloadConfig, PreloadCoordinator};
use aperture_test_utils::{
    catalog_of, catalog_with_shared_urls, wait_until, ScriptedFetcher, StaticSource,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn coordinator_for(
    photos: Vec<aperture_catalog::PhotoEntry>,
    fetcher: Arc<ScriptedFetcher>,
    config: PreloadConfig,
) -> PreloadCoordinator<Arc<StaticSource>> {
    let cache = Arc::new(CatalogCache::new(Arc::new(StaticSource::new(photos))));
    PreloadCoordinator::with_config(cache, fetcher, config)
}

#[tokio::test]
async fn deduplicates_urls_across_entries() {
    // 20 photos referencing 12 distinct URLs.
    let fetcher = Arc::new(ScriptedFetcher::new());
    let coordinator = coordinator_for(
        catalog_with_shared_urls(),
        Arc::clone(&fetcher),
        PreloadConfig::new().with_batch_delay(Duration::ZERO),
    );

    coordinator.start().await;

    assert_eq!(fetcher.call_count(), 12);
    assert_eq!(fetcher.distinct_calls(), 12);
    assert_eq!(coordinator.progress_percent(), 100);
    assert!(!coordinator.is_preloading());
    assert_eq!(coordinator.loaded_count(), 12);
}

#[tokio::test]
async fn partial_failures_still_complete_the_run() {
    let photos = catalog_of(10);
    let broken: Vec<String> = (0..3)
        .map(|i| format!("https://cdn.test/photo-{i}.jpg"))
        .collect();
    let fetcher = Arc::new(ScriptedFetcher::new().fail_for(broken.clone()));
    let coordinator = coordinator_for(
        photos,
        Arc::clone(&fetcher),
        PreloadConfig::new().with_batch_delay(Duration::ZERO),
    );

    coordinator.start().await;

    assert_eq!(coordinator.progress_percent(), 100);
    assert!(!coordinator.is_preloading());
    assert_eq!(coordinator.loaded_count(), 7);
    assert_eq!(coordinator.failed_count(), 3);
    for url in &broken {
        assert!(!coordinator.is_loaded(url));
        assert!(coordinator.failed_urls().contains(url));
    }
    assert!(coordinator.is_loaded("https://cdn.test/photo-5.jpg"));
}

#[tokio::test]
async fn empty_catalog_completes_immediately() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let coordinator = coordinator_for(Vec::new(), Arc::clone(&fetcher), PreloadConfig::new());

    coordinator.start().await;

    assert_eq!(coordinator.progress_percent(), 100);
    assert!(!coordinator.is_preloading());
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn missing_catalog_completes_immediately() {
    let source = Arc::new(StaticSource::new(catalog_of(5)));
    source.set_fail(true);
    let cache = Arc::new(CatalogCache::new(Arc::clone(&source)));
    let fetcher = Arc::new(ScriptedFetcher::new());
    let transport: Arc<dyn AssetFetcher> = Arc::clone(&fetcher) as _;
    let coordinator = PreloadCoordinator::new(cache, transport);

    coordinator.start().await;

    assert_eq!(coordinator.progress_percent(), 100);
    assert!(!coordinator.is_preloading());
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_100() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let coordinator = coordinator_for(
        catalog_of(25),
        Arc::clone(&fetcher),
        PreloadConfig::new().with_batch_delay(Duration::ZERO),
    );

    let mut progress = coordinator.subscribe();
    let collector = tokio::spawn(async move {
        let mut seen = Vec::new();
        loop {
            if progress.changed().await.is_err() {
                break;
            }
            let snapshot = *progress.borrow_and_update();
            seen.push(snapshot);
            if !snapshot.preloading && snapshot.percent == 100 {
                break;
            }
        }
        seen
    });

    coordinator.start().await;
    let seen = collector.await.unwrap();

    assert!(!seen.is_empty());
    let percents: Vec<u8> = seen.iter().map(|s| s.percent).collect();
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(*percents.last().unwrap(), 100);
    assert!(!seen.last().unwrap().preloading);
}

#[tokio::test(start_paused = true)]
async fn batch_delay_separates_batches() {
    // 25 URLs at batch size 10 make three batches and two delays.
    let fetcher = Arc::new(ScriptedFetcher::new());
    let coordinator = coordinator_for(
        catalog_of(25),
        Arc::clone(&fetcher),
        PreloadConfig::new().with_batch_delay(Duration::from_millis(100)),
    );

    let started = tokio::time::Instant::now();
    coordinator.start().await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_millis(250));
    assert_eq!(fetcher.call_count(), 25);
}

#[tokio::test]
async fn start_is_idempotent_while_a_run_is_live() {
    let fetcher = Arc::new(ScriptedFetcher::new().held());
    let coordinator = Arc::new(coordinator_for(
        catalog_of(12),
        Arc::clone(&fetcher),
        PreloadConfig::new().with_batch_delay(Duration::ZERO),
    ));

    let run = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.start().await })
    };

    assert!(wait_until(|| fetcher.call_count() > 0).await);
    assert!(coordinator.is_preloading());

    // A second start while the first run is live must not issue anything.
    coordinator.start().await;

    fetcher.release();
    run.await.unwrap();

    assert_eq!(fetcher.call_count(), 12);
    assert_eq!(coordinator.progress_percent(), 100);
}

#[tokio::test]
async fn preload_one_warms_without_touching_progress() {
    let fetcher = Arc::new(ScriptedFetcher::new().fail_for(["https://cdn.test/broken.jpg"]));
    let coordinator = coordinator_for(catalog_of(3), Arc::clone(&fetcher), PreloadConfig::new());

    coordinator.preload_one("https://cdn.test/extra.jpg").await;
    coordinator.preload_one("https://cdn.test/broken.jpg").await;

    assert!(coordinator.is_loaded("https://cdn.test/extra.jpg"));
    assert!(!coordinator.is_loaded("https://cdn.test/broken.jpg"));
    assert_eq!(coordinator.progress_percent(), 0);
    assert!(!coordinator.is_preloading());
}
