//! 撮影 → エンコード → API呼び出し → 表示 の制御
//!
//! 状態の変更はすべてフォアグラウンドのループ上で行う。
//! API呼び出しは非同期タスクで実行し、結果はチャネル経由でループへ戻す。

use crate::capture::{CaptureSession, CapturedImage};
use crate::client::{cancel_pair, CancelToken, DescriptionClient};
use crate::encoder;
use crate::error::{RequestError, Result, SnapError};
use crate::state::{Phase, StateError, UiState};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// 状態変化のたびに呼ばれる描画先
pub trait Renderer {
    fn render(&mut self, state: &UiState);
}

#[derive(Debug)]
pub enum Event {
    Described(std::result::Result<String, RequestError>),
}

pub struct App<R: Renderer> {
    state: UiState,
    session: CaptureSession,
    client: Arc<DescriptionClient>,
    renderer: R,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    in_flight: Option<CancelToken>,
}

impl<R: Renderer> App<R> {
    pub fn new(session: CaptureSession, client: DescriptionClient, renderer: R) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: UiState::default(),
            session,
            client: Arc::new(client),
            renderer,
            events_tx,
            events_rx,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// 撮影ボタン
    ///
    /// 撮影失敗はログのみでIdleに戻る。成功時はAPI呼び出しをバックグラウンドで開始する。
    pub async fn on_capture(&mut self) -> std::result::Result<(), StateError> {
        self.state.begin_capture()?;
        self.render();

        match self.session.capture().await {
            Ok(locator) => {
                let mut image = CapturedImage::new(locator);
                let raw = image.bytes().map(|b| b.to_vec());
                self.state.capture_succeeded(image)?;
                self.render();
                log::debug!("Getting description from image...");
                self.spawn_describe(raw);
            }
            Err(e) => {
                log::error!("Photo capture failed: {}", e);
                self.state.capture_failed()?;
                self.render();
            }
        }
        Ok(())
    }

    fn spawn_describe(&mut self, raw: Result<Vec<u8>>) {
        let (token, signal) = cancel_pair();
        self.in_flight = Some(token);

        let client = self.client.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match raw {
                Ok(bytes) => match tokio::task::spawn_blocking(move || encoder::encode(&bytes)).await {
                    Ok(Ok(uri)) => client.describe_cancellable(&uri, signal).await,
                    Ok(Err(e)) => Err(RequestError::Encode(e.to_string())),
                    Err(e) => Err(RequestError::Encode(e.to_string())),
                },
                Err(e) => Err(RequestError::Encode(e.to_string())),
            };
            if events.send(Event::Described(outcome)).is_err() {
                log::debug!("description dropped (app closed)");
            }
        });
    }

    /// バックグラウンドからの次のイベント
    pub async fn next_event(&mut self) -> Option<Event> {
        self.events_rx.recv().await
    }

    pub fn apply(&mut self, event: Event) -> std::result::Result<(), StateError> {
        match event {
            Event::Described(outcome) => {
                self.in_flight = None;
                if let Err(e) = &outcome {
                    log::error!("API Error: {}", e);
                }
                self.state.finish(outcome)?;
                self.render();
            }
        }
        Ok(())
    }

    /// 撮影して結果が表示されるまで待つ
    pub async fn capture_and_describe(&mut self) -> std::result::Result<(), StateError> {
        self.on_capture().await?;
        if self.state.phase() == &Phase::Sending {
            if let Some(event) = self.next_event().await {
                self.apply(event)?;
            }
        }
        Ok(())
    }

    pub fn cancel_in_flight(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    pub fn shutdown(mut self) {
        self.cancel_in_flight();
        let App { session, .. } = self;
        session.shutdown();
    }

    fn render(&mut self) {
        self.renderer.render(&self.state);
    }
}

/// 対話モード: Enterで撮影、qで終了
pub async fn run_interactive<R: Renderer>(mut app: App<R>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("操作: [Enter]撮影 [q]終了\n");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.map_err(SnapError::Io)? {
                    None => break,
                    Some(l) if l.trim().eq_ignore_ascii_case("q") => break,
                    Some(_) => {
                        if let Err(e) = app.on_capture().await {
                            log::warn!("{}", e);
                            println!("⏳ {}", e);
                        }
                    }
                }
            }
            Some(event) = app.next_event() => {
                if let Err(e) = app.apply(event) {
                    log::error!("{}", e);
                }
            }
        }
    }

    app.shutdown();
    Ok(())
}

/// ターミナル描画（ローディングはスピナー、結果は成功・失敗とも同じ形式）
#[derive(Default)]
pub struct TerminalRenderer {
    spinner: Option<ProgressBar>,
    last: Option<Phase>,
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, state: &UiState) {
        if self.last.as_ref() == Some(state.phase()) {
            return;
        }
        self.last = Some(state.phase().clone());

        if !state.is_loading {
            if let Some(spinner) = self.spinner.take() {
                spinner.finish_and_clear();
            }
        }

        match state.phase() {
            Phase::Idle => {}
            Phase::Capturing => println!("📸 撮影中..."),
            Phase::Sending => {
                if let Some(image) = &state.last_image {
                    println!("🖼  {}", image.locator());
                }
                let spinner = ProgressBar::new_spinner();
                spinner.set_message("説明を取得中...");
                spinner.enable_steady_tick(Duration::from_millis(100));
                self.spinner = Some(spinner);
            }
            Phase::Done(_) | Phase::Failed(_) => println!("\n{}\n", state.description),
        }
    }
}
