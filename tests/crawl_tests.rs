//! Integration tests for the crawl and search pipeline
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::sync::Arc;

use korni::config::{Config, ConnectionConfig, OutputConfig, SiteConfig};
use korni::crawler::{build_http_client, CrawlEnd, CrawlSignal, SiteWalker, STOPPED_BY_USER};
use korni::index::IndexWriter;
use korni::lemma::LemmaExtractor;
use korni::morphology::RussianMorphology;
use korni::search::SearchEngine;
use korni::service::IndexingService;
use korni::storage::{shared, SharedStorage, SiteStatus, SqliteStorage};
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the given mock site URL
fn create_test_config(site_url: &str, db_path: &str) -> Config {
    Config {
        connection: ConnectionConfig {
            user_agent: "KorniBot/1.0 (test)".to_string(),
            referrer: "https://www.google.com".to_string(),
            timeout_secs: 5,
            delay_ms: 1, // Very short for testing
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        sites: vec![SiteConfig {
            url: site_url.to_string(),
            name: "Тестовый сайт".to_string(),
        }],
    }
}

fn extractor() -> Arc<LemmaExtractor> {
    Arc::new(LemmaExtractor::new(Arc::new(RussianMorphology::new())))
}

fn test_storage() -> (SharedStorage, NamedTempFile) {
    let db_file = NamedTempFile::new().expect("Failed to create temp db");
    let storage = SqliteStorage::new(db_file.path()).expect("Failed to open storage");
    (shared(storage), db_file)
}

/// Mounts a small Russian site: a home page linking to two content
/// pages, one of which links back to the home page (a cycle).
async fn mount_test_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Главная</title></head><body>
            <p>Здесь живут кот и собака</p>
            <a href="/cats">Кошки</a>
            <a href="/dogs">Собаки</a>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cats"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Кошки</title></head><body>
            <p>Наш кот ловит мышей. Хвост кота полосатый</p>
            <a href="/">Назад</a>
            </body></html>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dogs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Собаки</title></head><body>
            <p>Собака сторожит дом</p>
            </body></html>"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_persists_pages_lemmas_and_indexes() {
    let server = MockServer::start().await;
    mount_test_site(&server).await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let service = IndexingService::new(config, storage.clone(), extractor(), CrawlSignal::new());
    service.index_all_sites().await.expect("Crawl failed");

    let s = storage.lock().await;
    let site = s
        .find_site_by_url(&server.uri())
        .unwrap()
        .expect("Site row missing");
    assert_eq!(site.status, SiteStatus::Indexed);
    assert_eq!(site.last_error, None);
    assert_eq!(s.count_pages(site.id).unwrap(), 3);

    // "кот" occurs on the home page once and the cats page twice
    // (кот + кота), so frequency counts two pages.
    let cat = s.find_lemma(site.id, "кот").unwrap().expect("Lemma missing");
    assert_eq!(cat.frequency, 2);

    let indexes = s.indexes_for_lemma(cat.id).unwrap();
    assert_eq!(indexes.len(), 2);
    let ranks: Vec<f32> = indexes.iter().map(|i| i.rank).collect();
    assert!(ranks.contains(&1.0));
    assert!(ranks.contains(&2.0));

    // The cycle back to "/" must not duplicate the home page.
    assert!(s.page_exists(site.id, "/").unwrap());
}

#[tokio::test]
async fn test_stored_titles_and_paths() {
    let server = MockServer::start().await;
    mount_test_site(&server).await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let service = IndexingService::new(config, storage.clone(), extractor(), CrawlSignal::new());
    service.index_all_sites().await.expect("Crawl failed");

    let s = storage.lock().await;
    let site = s.find_site_by_url(&server.uri()).unwrap().unwrap();

    assert!(s.page_exists(site.id, "/cats/").unwrap());
    assert!(s.page_exists(site.id, "/dogs/").unwrap());
}

#[tokio::test]
async fn test_recrawl_destroys_previous_state() {
    let server = MockServer::start().await;
    mount_test_site(&server).await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let service = IndexingService::new(config, storage.clone(), extractor(), CrawlSignal::new());
    service.index_all_sites().await.expect("First crawl failed");
    service.index_all_sites().await.expect("Second crawl failed");

    let s = storage.lock().await;
    let site = s.find_site_by_url(&server.uri()).unwrap().unwrap();

    // Counts identical to a single crawl: nothing accumulated.
    assert_eq!(s.count_pages(site.id).unwrap(), 3);
    let cat = s.find_lemma(site.id, "кот").unwrap().unwrap();
    assert_eq!(cat.frequency, 2);
}

#[tokio::test]
async fn test_dead_end_branch_does_not_stop_siblings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <a href="/missing">Пропавшая</a>
            <a href="/cats">Кошки</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("нет страницы"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>кот</p></body></html>"),
        )
        .mount(&server)
        .await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let service = IndexingService::new(config, storage.clone(), extractor(), CrawlSignal::new());
    service.index_all_sites().await.expect("Crawl failed");

    let s = storage.lock().await;
    let site = s.find_site_by_url(&server.uri()).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Indexed);

    // The 404 page is recorded with its status code but not indexed.
    assert!(s.page_exists(site.id, "/missing/").unwrap());
    assert!(s.page_exists(site.id, "/cats/").unwrap());
    let cat = s.find_lemma(site.id, "кот").unwrap().unwrap();
    assert_eq!(cat.frequency, 1);
}

#[tokio::test]
async fn test_unreachable_site_marked_failed() {
    let (storage, db_file) = test_storage();
    // Nothing listens on this address.
    let config = create_test_config("http://127.0.0.1:1", &db_file.path().to_string_lossy());

    let service = IndexingService::new(config, storage.clone(), extractor(), CrawlSignal::new());
    service.index_all_sites().await.expect("Dispatch failed");

    let s = storage.lock().await;
    let site = s.find_site_by_url("http://127.0.0.1:1").unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Failed);
    assert!(site.last_error.is_some());
}

#[tokio::test]
async fn test_stopped_crawl_marks_site_failed() {
    let server = MockServer::start().await;
    mount_test_site(&server).await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let site_id = {
        let mut s = storage.lock().await;
        s.replace_site(&server.uri(), "Тестовый сайт").unwrap()
    };

    let client = build_http_client(&config.connection).unwrap();
    let writer = IndexWriter::new(storage.clone(), extractor());

    // The signal is never started, so the walker observes a stop at its
    // first check point.
    let signal = CrawlSignal::new();
    let walker = Arc::new(SiteWalker::new(
        client,
        config.connection.clone(),
        storage.clone(),
        writer,
        signal,
        site_id,
        server.uri(),
    ));

    let end = walker.run(&server.uri()).await.expect("Walker errored");
    assert_eq!(end, CrawlEnd::Stopped);

    let s = storage.lock().await;
    let site = s.find_site_by_url(&server.uri()).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Failed);
    assert_eq!(site.last_error.as_deref(), Some(STOPPED_BY_USER));
}

#[tokio::test]
async fn test_stop_mid_crawl_leaves_no_half_indexed_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <p>Здесь живут кот и собака</p>
            <a href="/cats">Кошки</a>
            <a href="/dogs">Собаки</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    // The first child responds slowly so the stop request lands while
    // its fetch is in flight; the walker observes it at the check after
    // the page is persisted and indexed.
    Mock::given(method("GET"))
        .and(path("/cats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_millis(500))
                .set_body_string(
                    "<html><body><p>Наш кот ловит мышей. Хвост кота полосатый</p></body></html>",
                ),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dogs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Собака сторожит дом</p></body></html>"),
        )
        .mount(&server)
        .await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let site_id = {
        let mut s = storage.lock().await;
        s.replace_site(&server.uri(), "Тестовый сайт").unwrap()
    };

    let client = build_http_client(&config.connection).unwrap();
    let writer = IndexWriter::new(storage.clone(), extractor());
    let signal = CrawlSignal::new();
    signal.start();

    let stopper = signal.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        stopper.stop();
    });

    let walker = Arc::new(SiteWalker::new(
        client,
        config.connection.clone(),
        storage.clone(),
        writer,
        signal,
        site_id,
        server.uri(),
    ));

    let end = walker.run(&server.uri()).await.expect("Walker errored");
    assert_eq!(end, CrawlEnd::Stopped);

    let s = storage.lock().await;
    let site = s.find_site_by_url(&server.uri()).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Failed);
    assert_eq!(site.last_error.as_deref(), Some(STOPPED_BY_USER));

    // The home page and the in-flight first child were persisted before
    // the stop was observed; the second child was never reached.
    assert!(s.page_exists(site.id, "/").unwrap());
    assert!(s.page_exists(site.id, "/cats/").unwrap());
    assert!(!s.page_exists(site.id, "/dogs/").unwrap());
    assert_eq!(s.count_pages(site.id).unwrap(), 2);

    // Every stored page has a completed lemma pass: "кот" appears once
    // on the home page and twice on the cats page, so its frequency
    // covers both rows and the ranks carry each page's own count.
    let cat = s.find_lemma(site.id, "кот").unwrap().expect("Lemma missing");
    assert_eq!(cat.frequency, 2);
    let mut ranks: Vec<f32> = s
        .indexes_for_lemma(cat.id)
        .unwrap()
        .iter()
        .map(|i| i.rank)
        .collect();
    ranks.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(ranks, vec![1.0, 2.0]);
}

#[tokio::test]
async fn test_crawl_then_search_end_to_end() {
    let server = MockServer::start().await;
    mount_test_site(&server).await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let extractor = extractor();
    let service = IndexingService::new(
        config.clone(),
        storage.clone(),
        Arc::clone(&extractor),
        CrawlSignal::new(),
    );
    service.index_all_sites().await.expect("Crawl failed");

    let engine = SearchEngine::new(storage, extractor, config.sites.clone());
    let outcome = engine.search("кот", None, 0, 20).await.expect("Search failed");

    assert_eq!(outcome.count, 2);
    // The cats page mentions the root twice and ranks first.
    assert_eq!(outcome.results[0].uri, "/cats/");
    assert_eq!(outcome.results[0].title, "Кошки");
    assert!(outcome.results[0].snippet.contains("<b>кот</b>"));
    assert!((outcome.results[0].relevance - 1.0).abs() < f32::EPSILON);
    assert_eq!(outcome.results[1].uri, "/");
}

#[tokio::test]
async fn test_index_single_page() {
    let server = MockServer::start().await;
    mount_test_site(&server).await;

    let (storage, db_file) = test_storage();
    let config = create_test_config(&server.uri(), &db_file.path().to_string_lossy());

    let service = IndexingService::new(config, storage.clone(), extractor(), CrawlSignal::new());
    let page_url = format!("{}/dogs", server.uri());
    service.index_page(&page_url).await.expect("Indexing failed");

    let s = storage.lock().await;
    let site = s.find_site_by_url(&server.uri()).unwrap().unwrap();
    assert!(s.page_exists(site.id, "/dogs/").unwrap());
    assert!(s.find_lemma(site.id, "собак").unwrap().is_some());
}

#[tokio::test]
async fn test_page_outside_sites_rejected() {
    let (storage, db_file) = test_storage();
    let config = create_test_config("https://example.ru", &db_file.path().to_string_lossy());

    let service = IndexingService::new(config, storage, extractor(), CrawlSignal::new());
    let result = service.index_page("https://other.ru/page").await;
    assert!(result.is_err());
}
