//! End-to-end tests of the catalog client against an in-process mock API.
//!
//! Run with: cargo test -p podcast-proto --test catalog_client

mod common;

use common::{MockCatalog, COVER_BYTES};
use podcast_proto::api::{ApiError, CatalogClient, Resource, Target};
use podcast_proto::catalog::{ApiVersion, CatalogId, Environment};
use podcast_proto::config::{parse_config_str, Config};
use podcast_proto::images::ImageCache;
use podcast_proto::prefetch::{PrefetchJob, PrefetchPool};
use tokio::sync::mpsc;

const PROD_V1: Target = Target {
    environment: Environment::Production,
    version: ApiVersion::V1,
};
const PROD_V2: Target = Target {
    environment: Environment::Production,
    version: ApiVersion::V2,
};
const DOWN: Target = Target {
    environment: Environment::Development,
    version: ApiVersion::V1,
};
const GARBAGE: Target = Target {
    environment: Environment::Staging,
    version: ApiVersion::V1,
};

async fn setup() -> (MockCatalog, CatalogClient) {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.config()).expect("client");
    (mock, client)
}

#[tokio::test]
async fn station_index_from_config_file() -> anyhow::Result<()> {
    let mock = MockCatalog::start().await;
    let text = format!(
        "# podcast player\napi_base_url {}\napi_version v1\nenvironment prod\nprod_base_url {}\n",
        mock.url("/api"),
        mock.url("/api/"),
    );
    let config = Config::from_map(&parse_config_str(&text))?;
    let client = CatalogClient::new(&config)?;

    let ids = client
        .station_ids(Target::new(config.environment, config.api_version))
        .await;

    let pairs: Vec<(&str, &str)> = ids.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(pairs, vec![("KQED", "11"), ("WNYC", "22")]);
    assert_eq!(mock.state.requests(), vec!["/api/v1/stations?page[size]=400"]);
    Ok(())
}

#[tokio::test]
async fn station_details_keep_api_order() {
    let (_mock, client) = setup().await;
    let station = client
        .station(&CatalogId::from(11u64), PROD_V1)
        .await
        .expect("station 11");

    assert_eq!(station.title(), "KQED Public Radio KQED");
    assert_eq!(station.stream_url.as_deref(), Some("https://stream.example/kqed.mp3"));
    assert_eq!(station.logo_url.as_deref(), Some("https://img.example/kqed.png"));
    let keys: Vec<&str> = station.attributes.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "callsign", "name", "square_logo_small", "station_stream"]
    );

    let bare = client.station(&CatalogId::from(22u64), PROD_V1).await.expect("station 22");
    assert_eq!(bare.title(), "WNYC");
    assert!(bare.stream_url.is_none());

    assert!(client.station(&CatalogId::from(404u64), PROD_V1).await.is_none());
    assert!(client
        .station_attributes(&CatalogId::from(404u64), PROD_V1)
        .await
        .is_empty());
}

#[tokio::test]
async fn podcasts_and_episodes() {
    let (mock, client) = setup().await;

    let podcasts = client.podcasts_for_station(&CatalogId::from(11u64), PROD_V1).await;
    let titles: Vec<&str> = podcasts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Forum", "The California Report"]);
    assert_eq!(podcasts[1].id.as_str(), "502");
    assert!(podcasts[1].image_url.is_none());

    let episodes = client.episodes_for_podcast(&podcasts[0].id, PROD_V1).await;
    assert_eq!(episodes.len(), 2);
    assert_eq!(episodes[0].duration_label(), "52:05");
    assert_eq!(episodes[0].audio_url.as_deref(), Some("https://audio.example/9001.mp3"));
    assert_eq!(episodes[1].duration_label(), "0:59");
    assert!(episodes[1].published_date.is_none());

    assert!(client
        .podcasts_for_station(&CatalogId::from(22u64), PROD_V1)
        .await
        .is_empty());
    assert!(mock
        .state
        .requests()
        .contains(&"/api/v1/episodes?filter[podcast_id]=501&page[size]=100".to_string()));
}

#[tokio::test]
async fn podcast_image_url() {
    let (_mock, client) = setup().await;
    assert_eq!(
        client.podcast_image_url(&CatalogId::from(501u64), PROD_V1).await.as_deref(),
        Some("https://img.example/forum.png")
    );
    let empty = client
        .try_podcast_image_url(&CatalogId::from(502u64), PROD_V1)
        .await
        .unwrap_err();
    assert!(matches!(empty, ApiError::Shape { .. }));
    assert!(client.podcast_image_url(&CatalogId::from(7u64), PROD_V1).await.is_none());
}

#[tokio::test]
async fn server_errors_give_empty_results() {
    let (mock, client) = setup().await;
    let id = CatalogId::from(11u64);

    assert!(client.station_ids(DOWN).await.is_empty());
    assert!(client.station(&id, DOWN).await.is_none());
    assert!(client.station_attributes(&id, DOWN).await.is_empty());
    assert!(client.podcasts_for_station(&id, DOWN).await.is_empty());
    assert!(client.episodes_for_podcast(&id, DOWN).await.is_empty());
    assert!(client.podcast_image_url(&id, DOWN).await.is_none());

    let err = client.try_station_ids(DOWN).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }), "{err}");
    assert_eq!(mock.state.count("/broken/"), 7);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let (_mock, client) = setup().await;
    let err = client.try_station_ids(GARBAGE).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "{err}");
    assert_eq!(err.kind(), "decode");
    assert!(client.station_ids(GARBAGE).await.is_empty());
}

#[tokio::test]
async fn v2_sends_auth_header() {
    let (_mock, client) = setup().await;
    let ids = client.station_ids(PROD_V2).await;
    assert_eq!(ids.get("KUOW").map(CatalogId::as_str), Some("v2-33"));
    assert_eq!(ids.len(), 2);

    let station = client
        .station(&CatalogId::from("v2-11"), PROD_V2)
        .await
        .expect("v2 station");
    assert_eq!(station.name, "KQED v2");
}

#[tokio::test]
async fn v2_without_token_is_rejected() {
    let mock = MockCatalog::start().await;
    let config = Config {
        v2_auth_token: None,
        ..mock.config()
    };
    let client = CatalogClient::new(&config).expect("client");
    let err = client.try_station_ids(PROD_V2).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }), "{err}");
    assert!(client.station_ids(PROD_V2).await.is_empty());
}

#[tokio::test]
async fn v2_podcasts_are_unsupported_without_a_request() {
    let (mock, client) = setup().await;
    let id = CatalogId::from(11u64);

    let err = client.try_podcasts(&id, PROD_V2).await.unwrap_err();
    assert!(matches!(err, ApiError::Unsupported { .. }), "{err}");
    assert!(client.podcasts_for_station(&id, PROD_V2).await.is_empty());
    assert!(client.episodes_for_podcast(&id, PROD_V2).await.is_empty());
    assert!(client.podcast_image_url(&id, PROD_V2).await.is_none());
    assert!(client.url_for(&Resource::PodcastsByStation(id), PROD_V2).is_none());
    assert!(mock.state.requests().is_empty());
}

#[tokio::test]
async fn repeated_calls_agree() {
    let (_mock, client) = setup().await;
    let first = client.station_ids(PROD_V1).await;
    let second = client.station_ids(PROD_V1).await;
    assert_eq!(first, second);

    let a = client.podcasts_for_station(&CatalogId::from(11u64), PROD_V1).await;
    let b = client.podcasts_for_station(&CatalogId::from(11u64), PROD_V1).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn image_cache_downloads_once() -> anyhow::Result<()> {
    let (mock, client) = setup().await;
    let dir = tempfile::tempdir()?;
    let cache = ImageCache::new(dir.path().join("images"), client.http().clone());

    let url = mock.url("/img/cover.png?size=small");
    let path = cache.fetch(&url).await?;
    assert_eq!(path, cache.path_for(&url));
    assert!(path.starts_with(dir.path().join("images")));
    assert_eq!(std::fs::read(&path)?, COVER_BYTES);

    let again = cache.fetch(&url).await?;
    assert_eq!(again, path);
    assert_eq!(mock.state.count("/img/"), 1);

    let err = cache.fetch(&mock.url("/img/missing.png")).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert!(!cache.path_for(&mock.url("/img/missing.png")).exists());
    Ok(())
}

#[tokio::test]
async fn artwork_sharing_a_file_name_is_cached_separately() -> anyhow::Result<()> {
    let (mock, client) = setup().await;
    let dir = tempfile::tempdir()?;
    let cache = ImageCache::new(dir.path().to_path_buf(), client.http().clone());

    let a = cache.fetch(&mock.url("/art/501/image.jpg")).await?;
    let b = cache.fetch(&mock.url("/art/502/image.jpg")).await?;
    assert_ne!(a, b);
    assert_eq!(std::fs::read_to_string(&a)?, "art-for-501");
    assert_eq!(std::fs::read_to_string(&b)?, "art-for-502");
    assert_eq!(mock.state.count("/art/"), 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_fetches_of_one_url_all_succeed() -> anyhow::Result<()> {
    let (mock, client) = setup().await;
    let dir = tempfile::tempdir()?;
    let cache = ImageCache::new(dir.path().to_path_buf(), client.http().clone());
    let url = mock.url("/img/shared.png");

    let mut set = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let (cache, url) = (cache.clone(), url.clone());
        set.spawn(async move { cache.fetch(&url).await });
    }
    while let Some(outcome) = set.join_next().await {
        assert_eq!(outcome??, cache.path_for(&url));
    }
    assert_eq!(std::fs::read(cache.path_for(&url))?, COVER_BYTES);
    let leftovers = std::fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .count();
    assert_eq!(leftovers, 0);
    Ok(())
}

#[tokio::test]
async fn prefetch_pool_fills_cache() -> anyhow::Result<()> {
    let (mock, client) = setup().await;
    let dir = tempfile::tempdir()?;
    let cache = ImageCache::new(dir.path().to_path_buf(), client.http().clone());
    let pool = PrefetchPool::new(cache, 2);

    let mut jobs: Vec<PrefetchJob> = (0..6u64)
        .map(|i| PrefetchJob {
            podcast_id: CatalogId::from(i),
            image_url: Some(mock.url(&format!("/img/art{}.png", i))),
        })
        .collect();
    jobs.push(PrefetchJob {
        podcast_id: CatalogId::from(99u64),
        image_url: Some(mock.url("/img/missing.png")),
    });

    let (tx, mut rx) = mpsc::channel(16);
    let report = pool.spawn_batch(7, jobs, tx).join().await;
    assert_eq!(report.fetched, 6);
    assert_eq!(report.failed, 1);

    let mut results = Vec::new();
    while let Some(r) = rx.recv().await {
        results.push(r);
    }
    assert_eq!(results.len(), 7);
    assert!(results.iter().all(|r| r.batch == 7));
    let missing = results
        .iter()
        .find(|r| r.podcast_id.as_str() == "99")
        .expect("missing result");
    assert!(missing.image.is_none());
    assert!(cache_path(dir.path(), &mock.url("/img/art5.png")).exists());
    Ok(())
}

fn cache_path(dir: &std::path::Path, url: &str) -> std::path::PathBuf {
    dir.join(podcast_proto::images::file_name_for(url))
}

#[tokio::test]
async fn prefetch_pool_looks_up_missing_image_urls() -> anyhow::Result<()> {
    let (mock, client) = setup().await;
    let dir = tempfile::tempdir()?;
    let cache = ImageCache::new(dir.path().to_path_buf(), client.http().clone());
    let pool = PrefetchPool::new(cache.clone(), 2);

    let jobs = vec![
        PrefetchJob {
            podcast_id: CatalogId::from(503u64),
            image_url: None,
        },
        PrefetchJob {
            podcast_id: CatalogId::from(504u64),
            image_url: None,
        },
        // Listing has an empty image and the lookup finds none either.
        PrefetchJob {
            podcast_id: CatalogId::from(502u64),
            image_url: None,
        },
        PrefetchJob {
            podcast_id: CatalogId::from(1u64),
            image_url: Some(mock.url("/img/art1.png")),
        },
    ];

    let (tx, mut rx) = mpsc::channel(16);
    let report = pool
        .spawn_resolving(3, jobs, client.clone(), PROD_V1, tx)
        .join()
        .await;
    assert_eq!(report.fetched, 3);
    assert_eq!(report.failed, 1);

    let mut images = std::collections::HashMap::new();
    while let Some(r) = rx.recv().await {
        images.insert(r.podcast_id.as_str().to_string(), r.image);
    }
    let art = |id: &str| -> anyhow::Result<String> {
        let path = images[id].as_ref().ok_or_else(|| anyhow::anyhow!("no image for {}", id))?;
        Ok(std::fs::read_to_string(path)?)
    };
    assert_eq!(art("503")?, "art-for-503");
    assert_eq!(art("504")?, "art-for-504");
    assert!(images["502"].is_none());
    assert!(images["1"].is_some());

    assert_eq!(mock.state.count("/api/v1/podcasts/"), 3);
    assert_eq!(mock.state.count("/art/"), 2);
    Ok(())
}

#[tokio::test]
async fn v2_ids_are_escaped_in_the_path() {
    let (mock, client) = setup().await;
    let station = client
        .station(&CatalogId::from("kq/ed?x"), PROD_V2)
        .await
        .expect("station with an awkward id");
    assert_eq!(station.id.as_str(), "kq/ed?x");
    assert_eq!(mock.state.requests(), vec!["/api/v2/stations/kq%2Fed%3Fx"]);
}
