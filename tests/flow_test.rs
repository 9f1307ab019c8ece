//! 撮影 → 説明取得 → 表示 の一連の流れ

mod support;

use snap_describe::app::{App, Renderer};
use snap_describe::capture::{CaptureSession, FrameSource, StillSource};
use snap_describe::client::DescriptionClient;
use snap_describe::config::Config;
use snap_describe::state::{Phase, StateError, UiState};
use std::path::{Path, PathBuf};
use support::{choice_body, MockResponse, MockServer};
use tempfile::tempdir;

/// 描画内容を記録するレンダラ
#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(Phase, String, bool)>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, state: &UiState) {
        self.frames
            .push((state.phase().clone(), state.description.clone(), state.is_loading));
    }
}

fn build_app(camera: PathBuf, media: &Path, config: &Config) -> App<RecordingRenderer> {
    let session = CaptureSession::start(
        move || Box::new(StillSource::new(camera)) as Box<dyn FrameSource>,
        media.to_path_buf(),
    )
    .unwrap();
    let client = DescriptionClient::with_api_key(config, "sk-test".into()).unwrap();
    App::new(session, client, RecordingRenderer::default())
}

fn config_for(server: &MockServer) -> Config {
    Config {
        endpoint: server.url.clone(),
        ..Default::default()
    }
}

/// 成功: 先頭choiceの本文が表示され、ローディングが解除される
#[tokio::test]
async fn test_capture_and_describe_success() {
    let dir = tempdir().unwrap();
    let camera = support::write_sample_png(dir.path());
    let server = MockServer::start(vec![MockResponse::Json(
        200,
        r#"{"choices":[{"message":{"content":"A red apple on a table."}}]}"#.into(),
    )])
    .await;
    let mut app = build_app(camera, dir.path(), &config_for(&server));

    app.capture_and_describe().await.unwrap();

    let state = app.state();
    assert_eq!(state.description, "A red apple on a table.");
    assert!(!state.is_loading);
    assert_eq!(state.phase(), &Phase::Done("A red apple on a table.".into()));
    assert!(state.last_image.as_ref().unwrap().is_loaded());

    let phases: Vec<&str> = app.renderer().frames.iter().map(|(p, _, _)| p.name()).collect();
    assert_eq!(phases, vec!["Capturing", "Sending", "Done"]);

    // 送信中はローディング表示のみ（古い説明文なし）
    let sending = &app.renderer().frames[1];
    assert!(sending.2);
    assert!(sending.1.is_empty());

    // 送信された画像はPNGのData URI
    let body = server.requests()[0].json();
    let url = body["messages"][0]["content"][1]["image_url"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("data:image/png;base64,"));

    app.shutdown();
}

/// タイムアウト: "Error: " で始まる文字列が表示される
#[tokio::test]
async fn test_capture_and_describe_timeout() {
    let dir = tempdir().unwrap();
    let camera = support::write_sample_png(dir.path());
    let server = MockServer::start(vec![MockResponse::Hang]).await;
    let config = Config {
        connect_timeout_secs: 1,
        read_timeout_secs: 1,
        write_timeout_secs: 1,
        ..config_for(&server)
    };
    let mut app = build_app(camera, dir.path(), &config);

    app.capture_and_describe().await.unwrap();

    let state = app.state();
    assert!(state.description.starts_with("Error: "), "got: {}", state.description);
    assert!(matches!(state.phase(), Phase::Failed(_)));
    assert!(!state.is_loading);
}

/// 撮影失敗: Idleのまま、説明文は変わらず、APIは呼ばれない
#[tokio::test]
async fn test_capture_failure_stays_idle() {
    let dir = tempdir().unwrap();
    let server = MockServer::start(vec![MockResponse::Json(200, choice_body("unused"))]).await;
    let mut app = build_app(dir.path().join("no-camera.png"), dir.path(), &config_for(&server));

    app.capture_and_describe().await.unwrap();

    let state = app.state();
    assert_eq!(state.phase(), &Phase::Idle);
    assert!(state.description.is_empty());
    assert!(state.last_image.is_none());
    assert!(!state.is_loading);
    assert!(server.requests().is_empty());
}

/// 完了後の撮影失敗では前回の説明文と画像が残る
#[tokio::test]
async fn test_capture_failure_keeps_previous_description() {
    let dir = tempdir().unwrap();
    let camera = support::write_sample_png(dir.path());
    let server = MockServer::start(vec![MockResponse::Json(200, choice_body("first"))]).await;
    let mut app = build_app(camera.clone(), dir.path(), &config_for(&server));

    app.capture_and_describe().await.unwrap();
    assert_eq!(app.state().description, "first");
    let first_image = app.state().last_image.as_ref().unwrap().locator().clone();

    std::fs::remove_file(&camera).unwrap();
    app.capture_and_describe().await.unwrap();

    let state = app.state();
    assert_eq!(state.phase(), &Phase::Idle);
    assert_eq!(state.description, "first");
    assert!(!state.is_loading);
    assert_eq!(state.last_image.as_ref().unwrap().locator(), &first_image);
    assert_eq!(server.requests().len(), 1);

    let last = app.renderer().frames.last().unwrap();
    assert_eq!(last.1, "first");
}

/// 送信中の撮影は拒否する
#[tokio::test]
async fn test_capture_rejected_while_sending() {
    let dir = tempdir().unwrap();
    let camera = support::write_sample_png(dir.path());
    let server = MockServer::start(vec![MockResponse::Json(200, choice_body("first"))]).await;
    let mut app = build_app(camera, dir.path(), &config_for(&server));

    app.on_capture().await.unwrap();
    assert_eq!(app.state().phase(), &Phase::Sending);

    let second = app.on_capture().await;
    assert_eq!(second, Err(StateError::Busy("Sending")));

    let event = app.next_event().await.unwrap();
    app.apply(event).unwrap();
    assert_eq!(app.state().description, "first");
    assert_eq!(server.requests().len(), 1);
}

/// 完了後の再撮影で説明文が置き換わる
#[tokio::test]
async fn test_second_capture_replaces_description() {
    let dir = tempdir().unwrap();
    let camera = support::write_sample_png(dir.path());
    let server = MockServer::start(vec![
        MockResponse::Json(200, choice_body("first")),
        MockResponse::Json(200, choice_body("second")),
    ])
    .await;
    let mut app = build_app(camera, dir.path(), &config_for(&server));

    app.capture_and_describe().await.unwrap();
    let first_image = app.state().last_image.as_ref().unwrap().locator().clone();

    app.capture_and_describe().await.unwrap();
    assert_eq!(app.state().description, "second");
    let second_image = app.state().last_image.as_ref().unwrap().locator().clone();
    assert_ne!(first_image, second_image);
}

/// 実行中のリクエストを取り消す
#[tokio::test]
async fn test_cancel_in_flight_request() {
    let dir = tempdir().unwrap();
    let camera = support::write_sample_png(dir.path());
    let server = MockServer::start(vec![MockResponse::Hang]).await;
    let mut app = build_app(camera, dir.path(), &config_for(&server));

    app.on_capture().await.unwrap();
    app.cancel_in_flight();

    let event = app.next_event().await.unwrap();
    app.apply(event).unwrap();
    assert_eq!(app.state().description, "Error: request cancelled");
    assert!(!app.state().is_loading);
}
