use aperture_catalog::{CacheConfig, CatalogCache, CatalogError, CatalogKey};
use aperture_test_utils::{photo_in_category, StaticSource};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn gallery() -> Vec<aperture_catalog::PhotoEntry> {
    vec![
        photo_in_category("1", "https://cdn.test/a.jpg", "Portrait", "portrait"),
        photo_in_category("2", "https://cdn.test/b.jpg", "Portrait", "portrait"),
        photo_in_category("3", "https://cdn.test/c.jpg", "Events", "event"),
    ]
}

#[tokio::test(start_paused = true)]
async fn serving_within_ttl_reuses_entry() {
    let source = Arc::new(StaticSource::new(gallery()));
    let cache = CatalogCache::with_config(
        Arc::clone(&source),
        CacheConfig::new().with_ttl(Duration::from_secs(60)),
    );

    let first = cache.photos().await.unwrap();
    let second = cache.photos().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(source.calls(), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    cache.photos().await.unwrap();
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_retrieval_surfaces_error_and_discards_entry() {
    let source = Arc::new(StaticSource::new(gallery()));
    let cache = CatalogCache::with_config(
        Arc::clone(&source),
        CacheConfig::new().with_ttl(Duration::from_secs(60)),
    );

    cache.photos().await.unwrap();
    tokio::time::advance(Duration::from_secs(61)).await;

    source.set_fail(true);
    let err = cache.photos().await.unwrap_err();
    assert!(matches!(err, CatalogError::Retrieval(_)));
    assert_eq!(cache.entry_count(), 0);

    source.set_fail(false);
    let photos = cache.photos().await.unwrap();
    assert_eq!(photos.len(), 3);
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn category_keys_are_isolated() {
    let source = Arc::new(StaticSource::new(gallery()));
    let cache = CatalogCache::new(Arc::clone(&source));

    let portraits = cache.photos_by_category("portrait").await.unwrap();
    let events = cache.photos_by_category("event").await.unwrap();
    assert_eq!(portraits.len(), 2);
    assert_eq!(events.len(), 1);
    assert_eq!(source.calls(), 2);

    // Invalidating one key leaves the other key's entry untouched.
    cache.invalidate(&CatalogKey::Category("portrait".to_string()));
    cache.photos_by_category("event").await.unwrap();
    assert_eq!(source.calls(), 2);

    cache.photos_by_category("portrait").await.unwrap();
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn invalidate_all_forces_fresh_retrievals() {
    let source = Arc::new(StaticSource::new(gallery()));
    let cache = CatalogCache::new(Arc::clone(&source));

    cache.photos().await.unwrap();
    cache.photos_by_category("portrait").await.unwrap();
    assert_eq!(cache.entry_count(), 2);

    cache.invalidate_all();
    assert_eq!(cache.entry_count(), 0);

    cache.photos().await.unwrap();
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn empty_source_yields_empty_views() {
    let source = Arc::new(StaticSource::empty());
    let cache = CatalogCache::new(Arc::clone(&source));

    assert!(cache.photos().await.unwrap().is_empty());
    assert!(cache.featured_photos().await.unwrap().is_empty());
    assert!(cache.categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn categories_are_derived_from_cached_photos() {
    let source = Arc::new(StaticSource::new(gallery()));
    let cache = CatalogCache::new(Arc::clone(&source));

    let categories = cache.categories().await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].slug, "portrait");
    assert_eq!(categories[0].photo_count, 2);
    assert!(categories[0].is_featured);
    assert_eq!(categories[1].slug, "event");

    // Derivation rides on the `all` entry, no extra retrieval.
    cache.categories().await.unwrap();
    assert_eq!(source.calls(), 1);
}
