//! End-to-end runs against a local stand-in for the recent changes API.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use duckdb::Connection;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use wiki_edits::error::{AppError, FetchError};
use wiki_edits::models::Config;
use wiki_edits::pipeline::run_pipeline;
use wiki_edits::services::ChangeFeedClient;
use wiki_edits::storage::DuckDbPublisher;

/// How the fake API answers each request.
#[derive(Clone, Copy)]
enum Behaviour {
    /// One edit per window, stamped at the window's rcend; the first window's
    /// row has no userid.
    OneEditPerWindow,
    /// Always return `n` rows.
    Rows(usize),
    /// Always answer 503.
    Unavailable,
}

fn query_param<'a>(request: &'a str, key: &str) -> Option<&'a str> {
    let target = request.lines().next()?.split_whitespace().nth(1)?;
    let query = target.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn respond(behaviour: Behaviour, request: &str, served: usize) -> (String, String) {
    let rows: Vec<Value> = match behaviour {
        Behaviour::Unavailable => {
            return (
                "503 Service Unavailable".to_string(),
                "maintenance".to_string(),
            );
        }
        Behaviour::Rows(n) => (0..n)
            .map(|i| json!({ "type": "edit", "title": format!("Row {i}"), "userid": i }))
            .collect(),
        Behaviour::OneEditPerWindow => {
            let rcend = query_param(request, "rcend")
                .unwrap_or_default()
                .replace("%3A", ":");
            let mut row = json!({
                "type": "edit",
                "ns": 0,
                "title": format!("Page at {rcend}"),
                "user": "Example",
                "userid": 42,
                "oldlen": 10,
                "newlen": 11,
                "timestamp": rcend,
                "comment": "",
            });
            if served == 0 {
                row.as_object_mut().unwrap().remove("userid");
            }
            vec![row]
        }
    };

    let body = json!({ "batchcomplete": "", "query": { "recentchanges": rows } });
    ("200 OK".to_string(), body.to_string())
}

/// Start the fake API and return its base URL and a request counter.
async fn start_server(behaviour: Behaviour) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let served = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&served);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let request = String::from_utf8_lossy(&request).to_string();
            let index = counter.fetch_add(1, Ordering::SeqCst);

            let (status, body) = respond(behaviour, &request, index);
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}/w/api.php"), served)
}

fn config_for(base_url: String, db: &Path, window_size_secs: i64, limit: u32) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url;
    config.api.window_size_secs = window_size_secs;
    config.api.limit = limit;
    config.storage.database_path = db.display().to_string();
    config
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 31).unwrap()
}

async fn run(config: &Config) -> wiki_edits::error::Result<wiki_edits::pipeline::RunReport> {
    let client = ChangeFeedClient::new(Arc::new(config.api.clone())).unwrap();
    let publisher = Arc::new(DuckDbPublisher::new(&config.storage.database_path));
    run_pipeline(config, date(), &client, publisher).await
}

#[tokio::test]
async fn full_day_lands_in_duckdb() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("wikipedia.db");
    let (base_url, served) = start_server(Behaviour::OneEditPerWindow).await;
    let mut config = config_for(base_url, &db, 3_600, 500);
    config.api.max_concurrent = 4;

    let report = run(&config).await.unwrap();
    assert_eq!(report.stats.window_count, 24);
    assert_eq!(report.stats.record_count, 24);
    assert_eq!(report.stats.out_of_window_rows, 0);
    assert_eq!(served.load(Ordering::SeqCst), 24);

    let conn = Connection::open(&db).unwrap();
    let (rows, null_ids): (i64, i64) = conn
        .query_row(
            "SELECT count(*), count(*) FILTER (WHERE userid IS NULL) FROM iv.wiki_edits",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(rows, 24);
    assert_eq!(null_ids, 1);

    let first: String = conn
        .query_row(
            "SELECT title FROM iv.wiki_edits ORDER BY \"timestamp\" LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(first, "Page at 2024-10-31T00:00:00Z");
}

#[tokio::test]
async fn whole_day_window_saturates() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("wikipedia.db");
    let (base_url, _) = start_server(Behaviour::Rows(50)).await;
    let config = config_for(base_url, &db, 86_400, 50);

    let result = run(&config).await;

    assert!(matches!(
        result,
        Err(AppError::Fetch(FetchError::WindowSaturated { limit: 50, .. }))
    ));
    assert!(!db.exists());
}

#[tokio::test]
async fn service_unavailable_aborts_without_publishing() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("wikipedia.db");
    let (base_url, served) = start_server(Behaviour::Unavailable).await;
    let config = config_for(base_url, &db, 30, 500);

    let result = run(&config).await;

    match result {
        Err(AppError::Fetch(FetchError::RequestFailed { status, body })) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(served.load(Ordering::SeqCst), 1);
    assert!(!db.exists());
}
