mod common;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::{EngineLog, Faults, FakeEngine, FAKE_PDF};
use printd_lib::config::RenderDefaults;
use printd_lib::server::{self, AppState, Spool};
use printd_lib::{PipelineOptions, RenderPipeline};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tempfile::TempDir;
use tokio::net::TcpListener;

struct Harness {
    addr: SocketAddr,
    spool_dir: PathBuf,
    log: Arc<EngineLog>,
    _dir: TempDir,
}

impl Harness {
    fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    fn spooled_files(&self) -> usize {
        std::fs::read_dir(&self.spool_dir).unwrap().count()
    }
}

async fn start(faults: Faults) -> Harness {
    let dir = TempDir::new().unwrap();
    let spool = Spool::open(dir.path().join("spool")).await.unwrap();
    let spool_dir = spool.dir().to_path_buf();

    let engine = FakeEngine::new(faults);
    let log = engine.log();
    let pipeline = RenderPipeline::new(engine, PipelineOptions::default());
    let state = Arc::new(AppState::new(pipeline, spool, RenderDefaults::default()));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state, std::future::pending()));

    Harness {
        addr,
        spool_dir,
        log,
        _dir: dir,
    }
}

/// Poll `condition` for up to five seconds.
async fn eventually(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("timed out waiting for {what}");
}

fn upload(html: &str) -> Form {
    Form::new().part(
        "htmlFile",
        Part::bytes(html.as_bytes().to_vec())
            .file_name("invoice.html")
            .mime_str("text/html")
            .unwrap(),
    )
}

#[tokio::test]
async fn get_root_returns_usage() {
    let harness = start(Faults::default()).await;
    let body = reqwest::get(harness.url()).await.unwrap().text().await.unwrap();
    assert!(body.contains("htmlFile"));
    assert!(body.contains("curl"));
}

#[tokio::test]
async fn upload_returns_pdf_and_clears_spool() {
    let harness = start(Faults::default()).await;
    let form = upload("<h1>Invoice</h1>")
        .text("width", "4")
        .text("height", "6")
        .text("delay", "0");

    let response = reqwest::Client::new()
        .post(harness.url())
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    assert_eq!(response.bytes().await.unwrap().as_ref(), FAKE_PDF);
    assert_eq!(harness.log.closes(), 1);
    assert_eq!(harness.spooled_files(), 0);
}

#[tokio::test]
async fn stored_filename_is_rendered_and_removed() {
    let harness = start(Faults::default()).await;
    std::fs::write(harness.spool_dir.join("report.html"), "<p>report</p>").unwrap();

    let form = Form::new().text("filename", "report.html").text("delay", "0");
    let response = reqwest::Client::new()
        .post(harness.url())
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!harness.spool_dir.join("report.html").exists());
}

#[tokio::test]
async fn missing_document_is_bad_request() {
    let harness = start(Faults::default()).await;
    let form = Form::new().text("width", "8.5");
    let response = reqwest::Client::new()
        .post(harness.url())
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.log.opens(), 0);
}

#[tokio::test]
async fn traversal_filename_is_bad_request() {
    let harness = start(Faults::default()).await;
    let form = Form::new().text("filename", "../secrets.html");
    let response = reqwest::Client::new()
        .post(harness.url())
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_dimensions_are_bad_request() {
    let harness = start(Faults::default()).await;
    for (field, value) in [("width", "wide"), ("height", "-3"), ("delay", "later")] {
        let form = upload("<p>x</p>").text(field, value);
        let response = reqwest::Client::new()
            .post(harness.url())
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}={value}");
    }
    assert_eq!(harness.log.opens(), 0);
    assert_eq!(harness.spooled_files(), 0);
}

#[tokio::test]
async fn render_failure_is_generic_server_error() {
    let harness = start(Faults {
        capture_fails: true,
        ..Faults::default()
    })
    .await;

    let response = reqwest::Client::new()
        .post(harness.url())
        .multipart(upload("<p>x</p>").text("delay", "0"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await.unwrap();
    assert!(!body.contains("Printing failed"));
    assert_eq!(harness.log.closes(), 1);
    assert_eq!(harness.spooled_files(), 0);
}

#[tokio::test]
async fn delay_above_limit_is_bad_request() {
    let harness = start(Faults::default()).await;
    let too_long = (printd_lib::DEFAULT_MAX_SETTLE_DELAY.as_millis() + 1).to_string();

    let response = reqwest::Client::new()
        .post(harness.url())
        .multipart(upload("<p>x</p>").text("delay", too_long))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.text().await.unwrap().contains("limit"));
    assert_eq!(harness.log.opens(), 0);
    assert_eq!(harness.spooled_files(), 0);
}

#[tokio::test]
async fn client_disconnect_cancels_render() {
    let harness = start(Faults {
        never_loads: true,
        ..Faults::default()
    })
    .await;

    let url = harness.url();
    let client = tokio::spawn(async move {
        reqwest::Client::new()
            .post(url)
            .multipart(upload("<p>slow</p>").text("delay", "0"))
            .send()
            .await
    });

    eventually("the render to start", || harness.log.opens() == 1).await;
    assert_eq!(harness.spooled_files(), 1);
    client.abort();

    eventually("the target to be released", || harness.log.closes() == 1).await;
    eventually("the spool to be cleared", || harness.spooled_files() == 0).await;
    assert_eq!(harness.log.opens(), 1);
}
