//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small artist index and artist pages
//! and run the full crawl pipeline end-to-end against it.

use coverage_crawler::config::{
    Config, CrawlerConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};
use coverage_crawler::crawler::{run_crawl, Coordinator};
use coverage_crawler::storage::{RunStatus, SqliteStorage, Storage};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, dir: &Path, letters: &[&str]) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers: 3,
            max_retries: 0,
            retry_delay_ms: 10,
            request_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        site: SiteConfig {
            base_url: base_url.to_string(),
            index_path: "artists/by/{letter}/".to_string(),
            letters: letters.iter().map(|l| l.to_string()).collect(),
        },
        selectors: SelectorConfig::default(),
        output: OutputConfig {
            database_path: dir.join("coverage.db").to_string_lossy().into_owned(),
            summary_path: dir.join("summary.md").to_string_lossy().into_owned(),
            json_dir: Some(dir.join("artists").to_string_lossy().into_owned()),
        },
    }
}

fn index_page(artists: &[&str], next: Option<&str>) -> String {
    let links: String = artists
        .iter()
        .map(|slug| format!(r#"<li><a href="/artists/{}/">{}</a></li>"#, slug, slug))
        .collect();
    let next = next
        .map(|href| {
            format!(
                r#"<div class="pagination"><a class="next" href="{}">Next</a></div>"#,
                href
            )
        })
        .unwrap_or_default();
    format!(
        r#"<html><body><div id="main"><ul id="artist-list">{}</ul>{}</div></body></html>"#,
        links, next
    )
}

fn alpha_page(review_count: usize) -> String {
    let reviews: String = (1..=review_count)
        .map(|n| {
            format!(
                r#"<a href="/reviews/albums/{n}-record/"><img src="/img/{n}.jpg">
                     <h1>Alpha</h1><h2>Record {n}</h2><h3>Critic {n}</h3></a>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="main">
             <div class="object-detail"><h1>Alpha</h1></div>
             <div class="search-group"><h1>Album Reviews</h1>{reviews}</div>
             <div class="search-group"><h1>News</h1><ul>
               <li><a href="/news/1-alpha-tour/">Alpha announce tour</a></li>
             </ul></div>
             <div class="search-group"><h1>Best New Music</h1><a href="/bnm/">x</a></div>
           </div></body></html>"#
    )
}

const BETA_PAGE: &str = r#"<html><body><div id="main">
    <div class="object-detail"><h1>Beta</h1></div>
    <div class="search-group"><h1>Tracks</h1>
      <a href="/reviews/tracks/7-song/"><img src="/img/t.jpg"><h1>Beta</h1><h2>Song</h2></a>
    </div>
    <div class="search-group"><h1>The Pitch</h1><ul>
      <li><a href="https://elsewhere.example/pitch/1">Beta in conversation</a></li>
    </ul></div>
  </div></body></html>"#;

const GAMMA_PAGE: &str = r#"<html><body><div id="main"></div></body></html>"#;

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Index "a" spans two pages; index "b" repeats an artist and links one that 404s
async fn mount_site(server: &MockServer, alpha_reviews: usize) {
    mount_html(
        server,
        "/artists/by/a/",
        index_page(&["1-alpha", "2-beta"], Some("/artists/by/a/page/2/")),
    )
    .await;
    mount_html(
        server,
        "/artists/by/a/page/2/",
        index_page(&["3-gamma", "1-alpha"], None),
    )
    .await;
    mount_html(
        server,
        "/artists/by/b/",
        index_page(&["2-beta", "4-missing"], None),
    )
    .await;

    mount_html(server, "/artists/1-alpha/", alpha_page(alpha_reviews)).await;
    mount_html(server, "/artists/2-beta/", BETA_PAGE.to_string()).await;
    mount_html(server, "/artists/3-gamma/", GAMMA_PAGE.to_string()).await;
}

fn open(config: &Config) -> SqliteStorage {
    SqliteStorage::new(Path::new(&config.output.database_path)).expect("open database")
}

#[tokio::test]
async fn test_full_crawl_stores_coverage() {
    let server = MockServer::start().await;
    mount_site(&server, 2).await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["a", "b"]);

    let summary = run_crawl(config.clone(), "hash-1".to_string(), CancellationToken::new())
        .await
        .expect("crawl should finish");

    let totals = &summary.run.totals;
    assert_eq!(summary.status(), RunStatus::Completed);
    assert_eq!(totals.index_pages, 3);
    assert_eq!(totals.artists_discovered, 4);
    assert_eq!(totals.artists_reconciled, 3);
    assert_eq!(totals.artists_failed, 1);
    assert_eq!(totals.failures.get("fetch"), Some(&1));
    assert_eq!(totals.coverage_records, 5);

    let storage = open(&config);
    assert_eq!(storage.count_artists().unwrap(), 3);

    let alpha = storage.get_artist(1).unwrap().expect("alpha stored");
    assert_eq!(alpha.slug, "1-alpha");
    assert_eq!(alpha.name.as_deref(), Some("Alpha"));
    assert_eq!(alpha.coverage_counts["Album Reviews"], 2);
    assert_eq!(alpha.coverage_counts["News"], 1);
    assert_eq!(alpha.coverage_counts["Best New Music"], 0);

    let coverage = storage.get_coverage(1).unwrap();
    assert_eq!(coverage.len(), 3);
    let review = coverage.iter().find(|c| c.kind == "review").unwrap();
    assert_eq!(review.title, "Alpha: Record 1");
    assert_eq!(review.author.as_deref(), Some("Critic 1"));
    assert_eq!(
        review.url,
        format!("{}/reviews/albums/1-record/", server.uri())
    );

    let beta = storage.get_coverage(2).unwrap();
    let kinds: Vec<&str> = beta.iter().map(|c| c.kind.as_str()).collect();
    assert_eq!(kinds, vec!["editorialPick", "track"]);
    assert_eq!(beta[0].url, "https://elsewhere.example/pitch/1");

    let gamma = storage.get_artist(3).unwrap().expect("gamma stored");
    assert!(gamma.name.is_none());
    assert!(storage.get_coverage(3).unwrap().is_empty());
    assert!(storage.get_artist(4).unwrap().is_none());

    // Unfamiliar kinds are reported and persisted with the run
    let alpha_url = format!("{}/artists/1-alpha/", server.uri());
    assert_eq!(summary.unfamiliar["Best New Music"], vec![alpha_url]);
    assert_eq!(
        storage.get_unfamiliar(summary.run.id).unwrap(),
        summary.unfamiliar
    );

    // Side outputs
    let markdown = std::fs::read_to_string(&config.output.summary_path).unwrap();
    assert!(markdown.contains("## Unfamiliar Coverage Types"));
    assert!(markdown.contains("| fetch | 1 |"));

    let doc = std::fs::read_to_string(dir.path().join("artists").join("1-alpha.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&doc).unwrap();
    assert_eq!(doc["name"], "Alpha");
    assert_eq!(doc["coverage"].as_array().map(Vec::len), Some(3));
    assert!(!dir.path().join("artists").join("4-missing.json").exists());
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let server = MockServer::start().await;
    mount_site(&server, 2).await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["a", "b"]);

    run_crawl(config.clone(), "hash".to_string(), CancellationToken::new())
        .await
        .unwrap();
    let (first_alpha, first_coverage, first_total) = {
        let storage = open(&config);
        (
            storage.get_artist(1).unwrap(),
            storage.get_coverage(1).unwrap(),
            storage.count_coverage().unwrap(),
        )
    };

    let second = run_crawl(config.clone(), "hash".to_string(), CancellationToken::new())
        .await
        .unwrap();

    let storage = open(&config);
    assert_eq!(storage.get_artist(1).unwrap(), first_alpha);
    assert_eq!(storage.get_coverage(1).unwrap(), first_coverage);
    assert_eq!(storage.count_coverage().unwrap(), first_total);
    assert_eq!(storage.count_artists().unwrap(), 3);

    let latest = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(latest.id, second.run.id);
    assert!(latest.id > 1);
}

#[tokio::test]
async fn test_recrawl_replaces_removed_coverage() {
    let server = MockServer::start().await;
    mount_site(&server, 3).await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["a"]);

    run_crawl(config.clone(), "hash".to_string(), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(open(&config).get_coverage(1).unwrap().len(), 4);

    // The site now lists a single review for the artist
    server.reset().await;
    mount_site(&server, 1).await;

    run_crawl(config.clone(), "hash".to_string(), CancellationToken::new())
        .await
        .unwrap();

    let storage = open(&config);
    let coverage = storage.get_coverage(1).unwrap();
    assert_eq!(coverage.len(), 2);
    assert_eq!(
        coverage.iter().filter(|c| c.kind == "review").count(),
        1
    );
    assert_eq!(
        storage.get_artist(1).unwrap().unwrap().coverage_counts["Album Reviews"],
        1
    );
}

#[tokio::test]
async fn test_pagination_cycle_terminates() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/artists/by/a/",
        index_page(&["1-alpha"], Some("/artists/by/a/page/2/")),
    )
    .await;
    mount_html(
        &server,
        "/artists/by/a/page/2/",
        index_page(&["3-gamma"], Some("/artists/by/a/")),
    )
    .await;
    mount_html(&server, "/artists/1-alpha/", alpha_page(1)).await;
    mount_html(&server, "/artists/3-gamma/", GAMMA_PAGE.to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["a"]);

    let summary = run_crawl(config, "hash".to_string(), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.run.totals.index_pages, 2);
    assert_eq!(summary.run.totals.pagination_cycles, 1);
    assert_eq!(summary.run.totals.artists_reconciled, 2);
}

#[tokio::test]
async fn test_cancelled_crawl_is_interrupted() {
    let server = MockServer::start().await;
    mount_site(&server, 2).await;
    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["a", "b"]);

    let coordinator = Coordinator::new(config.clone(), "hash").unwrap();
    coordinator.cancellation_token().cancel();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.status(), RunStatus::Interrupted);
    let storage = open(&config);
    assert_eq!(storage.count_artists().unwrap(), 0);
    assert_eq!(
        storage.get_latest_run().unwrap().unwrap().status,
        RunStatus::Interrupted
    );
}
