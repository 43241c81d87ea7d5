//! Integration tests for the website server.
//!
//! Each test starts a real server on an ephemeral loopback port and talks to
//! it over HTTP. No external database is needed: the database check either
//! uses the mock probe or points at a closed port.

use std::net::SocketAddr;
use std::sync::Arc;

use gitops_website::api::{AppState, SiteSettings};
use gitops_website::config::DatabaseSettings;
use gitops_website::metrics::{find_sample, MetricsCollector, METRIC_HTTP_REQUESTS};
use gitops_website::probe::{DependencyProbe, MockProbe, PostgresProbe, UNREACHABLE_TEXT};
use gitops_website::{AppError, Server};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A server running in the background until dropped or stopped.
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<gitops_website::Result<()>>,
}

impl TestServer {
    async fn start(probe: Option<Arc<dyn DependencyProbe>>) -> Self {
        let mut state = AppState::new(
            MetricsCollector::new().unwrap(),
            SiteSettings {
                heading: "davtrogr Website".to_string(),
            },
        );
        if let Some(probe) = probe {
            state = state.with_probe(probe);
        }

        let server = Server::bind(SocketAddr::from(([127, 0, 0, 1], 0)), state)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(server.run(async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.handle).await.unwrap().unwrap();
    }
}

async fn get_text(url: &str) -> (u16, String) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn healthz_answers_ok() {
    let server = TestServer::start(Some(Arc::new(MockProbe::unreachable()))).await;

    let (status, body) = get_text(&server.url("/healthz")).await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");

    server.stop().await;
}

#[tokio::test]
async fn index_survives_unreachable_postgres() {
    let settings = DatabaseSettings {
        host: "127.0.0.1".to_string(),
        port: 1,
        user: "app".to_string(),
        password: "secret".to_string(),
        name: "website".to_string(),
    };
    let probe: Arc<dyn DependencyProbe> = Arc::new(PostgresProbe::connect(&settings).await);
    let server = TestServer::start(Some(probe)).await;

    let (status, body) = get_text(&server.url("/")).await;
    assert_eq!(status, 200);
    assert!(body.contains("<h1>davtrogr Website</h1>"));
    assert!(body.contains("unreachable"));
    assert!(body.contains(UNREACHABLE_TEXT));

    server.stop().await;
}

#[tokio::test]
async fn metrics_count_every_request() {
    let server = TestServer::start(None).await;

    for _ in 0..7 {
        let (status, _) = get_text(&server.url("/")).await;
        assert_eq!(status, 200);
    }
    for _ in 0..3 {
        get_text(&server.url("/healthz")).await;
    }

    let (status, text) = get_text(&server.url("/metrics")).await;
    assert_eq!(status, 200);
    assert_eq!(
        find_sample(
            &text,
            METRIC_HTTP_REQUESTS,
            &[("path", "/"), ("method", "GET"), ("status", "200")]
        ),
        Some(7.0)
    );
    assert_eq!(
        find_sample(
            &text,
            METRIC_HTTP_REQUESTS,
            &[("path", "/healthz"), ("method", "GET"), ("status", "200")]
        ),
        Some(3.0)
    );
    assert_eq!(
        find_sample(
            &text,
            "http_request_duration_seconds_count",
            &[("path", "/healthz"), ("method", "GET")]
        ),
        Some(3.0)
    );

    server.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients_are_counted_exactly() {
    let server = TestServer::start(None).await;
    let client = reqwest::Client::new();

    let requests: Vec<_> = (0..100)
        .map(|_| {
            let client = client.clone();
            let url = server.url("/");
            tokio::spawn(async move { client.get(url).send().await.unwrap().status().as_u16() })
        })
        .collect();
    for request in requests {
        assert_eq!(request.await.unwrap(), 200);
    }

    let (_, text) = get_text(&server.url("/metrics")).await;
    assert_eq!(
        find_sample(
            &text,
            METRIC_HTTP_REQUESTS,
            &[("path", "/"), ("method", "GET"), ("status", "200")]
        ),
        Some(100.0)
    );

    server.stop().await;
}

#[tokio::test]
async fn second_server_on_same_port_is_fatal() {
    let server = TestServer::start(None).await;

    let state = AppState::new(
        MetricsCollector::new().unwrap(),
        SiteSettings {
            heading: "davtrogr Website".to_string(),
        },
    );
    let result = Server::bind(server.addr, state).await;
    assert!(matches!(result, Err(AppError::Bind { .. })));

    // The first server keeps serving.
    let (status, _) = get_text(&server.url("/healthz")).await;
    assert_eq!(status, 200);

    server.stop().await;
}
