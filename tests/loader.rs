mod common;

use anyhow::Result;
use blueberry::{CacheManager, CatalogLoader, LoadError};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_load_assembles_catalog_in_shard_order() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.set_shard(
        0,
        &[
            "https://e/v0|https://t/0.jpg||First Video|rock;jazz|Music|Alice|12:34|1000|10|1",
            "https://e/v1|https://t/1.jpg||Second Video",
        ],
    );
    origin.set_shard(1, &["https://e/v2|https://t/2.jpg||Third Video"]);
    origin.set_shard(2, &[]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 3));

    let catalog = loader.load_all().await?;
    assert_eq!(catalog.len(), 3);

    let ids: Vec<&str> = catalog.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["0_0", "0_1", "1_0"]);
    let unique: std::collections::HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    let first = catalog.get("0_0").unwrap();
    assert_eq!(first.title, "First Video");
    assert_eq!(first.embed_url, "https://e/v0");
    assert_eq!(first.thumbnail_url, "https://t/0.jpg");
    assert_eq!(first.tags, vec!["rock", "jazz"]);
    assert_eq!(first.categories, vec!["Music"]);
    assert_eq!(first.performer, "Alice");
    assert_eq!(first.duration, "12:34");
    assert_eq!(first.views, "1000");

    // Short packed strings leave the trailing fields empty
    let second = catalog.get("0_1").unwrap();
    assert_eq!(second.title, "Second Video");
    assert!(second.tags.is_empty());
    assert_eq!(second.performer, "");

    let report = loader.last_report().unwrap();
    assert_eq!(report.total_shards, 3);
    assert_eq!(report.shards_loaded, 3);
    assert_eq!(report.shards_failed, 0);
    assert_eq!(report.records_dropped, 0);
    assert_eq!(report.videos, 3);

    Ok(())
}

#[tokio::test]
async fn test_catalog_is_memoized_until_reset() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.set_shard(0, &["https://e/v0|t||Original"]);
    origin.set_shard(1, &["https://e/v1|t||Other"]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 2));

    let first = loader.load_all().await?;
    assert_eq!(origin.shard_hits(0), 1);
    assert_eq!(origin.shard_hits(1), 1);

    // Second call returns the same catalog without touching the origin
    let second = loader.load_all().await?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(origin.shard_hits(0), 1);
    assert_eq!(origin.shard_hits(1), 1);

    // After reset the next load fetches again and sees new data
    origin.set_shard(0, &["https://e/v0|t||Updated"]);
    loader.reset();
    let third = loader.load_all().await?;
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(origin.shard_hits(0), 2);
    assert_eq!(third.get("0_0").unwrap().title, "Updated");

    Ok(())
}

#[tokio::test]
async fn test_concurrent_first_loads_fetch_each_shard_once() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.set_shard(0, &["https://e/v0|t||A"]);
    origin.set_shard(1, &["https://e/v1|t||B"]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 2));

    let (a, b) = tokio::join!(loader.load_all(), loader.load_all());
    let a = a?;
    let b = b?;

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(origin.shard_hits(0), 1);
    assert_eq!(origin.shard_hits(1), 1);

    Ok(())
}

#[tokio::test]
async fn test_majority_shard_failure_aborts_early() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.fail_shard(0);
    origin.fail_shard(1);
    origin.fail_shard(2);
    origin.set_shard(3, &["https://e/v|t||Never Reached"]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 4));

    // Threshold 0.5 of 4 shards: the third failure crosses it
    let err = loader.load_all().await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::MajorityShardsFailed {
            failed: 3,
            total: 4
        }
    ));
    assert!(err.to_string().contains("internet connection"));

    // The abort happened inside the loop; shard 3 was never requested
    assert_eq!(origin.shard_hits(3), 0);
    assert!(loader.last_report().is_none());

    Ok(())
}

#[tokio::test]
async fn test_minority_shard_failures_are_tolerated() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    // Two distinct failure modes count the same: an HTTP 500 and a body
    // that is not a JSON array
    origin.fail_shard(0);
    origin.set_raw_shard(2, r#"{"unexpected": "object"}"#);
    origin.set_shard(1, &["https://e/v1|t||Kept One"]);
    origin.set_shard(3, &["https://e/v3|t||Kept Two"]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 4));

    // Two failures of four never exceeds the 0.5 threshold
    let catalog = loader.load_all().await?;
    let ids: Vec<&str> = catalog.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["1_0", "3_0"]);

    let report = loader.last_report().unwrap();
    assert_eq!(report.shards_loaded, 2);
    assert_eq!(report.shards_failed, 2);
    assert_eq!(report.videos, 2);

    Ok(())
}

#[tokio::test]
async fn test_all_shards_empty_is_no_records_error() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.set_shard(0, &[]);
    origin.set_shard(1, &[]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 2));

    let err = loader.load_all().await.unwrap_err();
    assert!(matches!(err, LoadError::NoRecords { shards_ok: 2 }));
    assert!(err.to_string().contains("refreshing"));

    Ok(())
}

#[tokio::test]
async fn test_malformed_elements_drop_without_shifting_ids() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    // Index 1 lacks the embed field, index 2 is not an object
    origin.set_raw_shard(
        0,
        r#"[{"embed": "https://e/v0|t||Alpha"}, {"thumb": "t"}, 42, {"embed": "https://e/v3|t||Delta"}]"#,
    );

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 1));

    let catalog = loader.load_all().await?;
    let ids: Vec<&str> = catalog.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["0_0", "0_3"]);

    let report = loader.last_report().unwrap();
    assert_eq!(report.records_dropped, 2);
    assert_eq!(report.videos, 2);

    Ok(())
}

#[tokio::test]
async fn test_videos_by_ids_returns_catalog_order() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.set_shard(0, &["https://e/a|t||A", "https://e/b|t||B"]);
    origin.set_shard(1, &["https://e/c|t||C"]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 2));

    // Request order differs from catalog order; one id is unknown
    let videos = loader
        .videos_by_ids(&["1_0", "0_1", "9_9"])
        .await?;
    let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["0_1", "1_0"]);

    Ok(())
}

#[tokio::test]
async fn test_timed_out_shard_counts_as_failure() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.set_shard(0, &["https://e/a|t||Quick"]);
    origin.set_shard(1, &["https://e/b|t||Slow"]);
    origin.delay_shard(1, Duration::from_millis(1500));

    let dir = common::setup_temp_dir()?;
    let mut config = common::test_cache_config(dir.path(), &origin.base_url);
    config.timeout = Duration::from_millis(300);
    let manager = Arc::new(CacheManager::new(config)?);
    manager.install().await?;
    manager.activate()?;

    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 2));

    // The slow shard trips the client timeout and is skipped like any
    // other failed shard
    let catalog = loader.load_all().await?;
    let ids: Vec<&str> = catalog.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["0_0"]);

    let report = loader.last_report().unwrap();
    assert_eq!(report.shards_loaded, 1);
    assert_eq!(report.shards_failed, 1);

    Ok(())
}

#[tokio::test]
async fn test_video_by_id() -> Result<()> {
    let origin = common::TestOrigin::start().await?;
    common::seed_manifest(&origin);
    origin.set_shard(0, &["https://e/a|t||Only One"]);

    let dir = common::setup_temp_dir()?;
    let manager = common::active_manager(dir.path(), &origin).await?;
    let loader = CatalogLoader::new(manager, common::test_loader_options(&origin.base_url, 1));

    let found = loader.video_by_id("0_0").await?;
    assert_eq!(found.unwrap().title, "Only One");

    let missing = loader.video_by_id("42_0").await?;
    assert!(missing.is_none());

    Ok(())
}
