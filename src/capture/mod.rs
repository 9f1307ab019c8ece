//! 画像取得モジュール
//!
//! カメラからの静止画1枚を撮影して保存し、保存先のLocatorを返す。
//! 撮影はユーザー操作でのみ呼ばれる。

mod source;
#[cfg(feature = "webcam")]
mod webcam;
mod worker;

pub use source::{FrameSource, StillSource};
#[cfg(feature = "webcam")]
pub use webcam::WebcamSource;

use crate::error::{CaptureError, Result, SnapError};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::oneshot;
use worker::{Command, Worker};

/// 保存済み画像の参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator(PathBuf);

impl Locator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn uri(&self) -> String {
        format!("file://{}", self.0.display())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri())
    }
}

/// 撮影済み画像（バイト列は必要になった時点で読み込む）
#[derive(Debug, Clone)]
pub struct CapturedImage {
    locator: Locator,
    raw: Option<Vec<u8>>,
}

impl CapturedImage {
    pub fn new(locator: Locator) -> Self {
        Self { locator, raw: None }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn is_loaded(&self) -> bool {
        self.raw.is_some()
    }

    pub fn bytes(&mut self) -> Result<&[u8]> {
        if self.raw.is_none() {
            let path = self.locator.path();
            let data = std::fs::read(path)
                .map_err(|_| SnapError::FileNotFound(path.display().to_string()))?;
            self.raw = Some(data);
        }
        Ok(self.raw.as_deref().unwrap_or_default())
    }
}

/// カメラセッション
///
/// 専用ワーカースレッドを1本所有する。`capture` のたびにワーカー側で
/// 既存パイプラインを解除してから再バインドするため、有効なパイプラインは常に最大1つ。
pub struct CaptureSession {
    commands: Sender<Command>,
    handle: Option<JoinHandle<()>>,
    output_dir: PathBuf,
    active: Arc<AtomicUsize>,
}

impl CaptureSession {
    /// ワーカーを起動
    ///
    /// `factory` はワーカースレッド上で呼ばれ、カメラ入力を生成する
    pub fn start<F>(factory: F, output_dir: PathBuf) -> Result<Self>
    where
        F: FnOnce() -> Box<dyn FrameSource> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let active = Arc::new(AtomicUsize::new(0));
        let worker_active = active.clone();

        let handle = std::thread::Builder::new()
            .name("camera-worker".into())
            .spawn(move || Worker::new(factory(), worker_active).run(rx))?;

        Ok(Self {
            commands: tx,
            handle: Some(handle),
            output_dir,
            active,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// プレビュー用パイプラインをバインド（フレームを `sink` へ送る）
    pub fn bind_preview(&self, sink: Sender<RgbaImage>) -> std::result::Result<(), CaptureError> {
        self.commands
            .send(Command::BindPreview(sink))
            .map_err(|_| CaptureError::WorkerGone)
    }

    pub fn unbind(&self) -> std::result::Result<(), CaptureError> {
        self.commands
            .send(Command::Unbind)
            .map_err(|_| CaptureError::WorkerGone)
    }

    /// 静止画を1枚撮影して保存
    pub async fn capture(&self) -> std::result::Result<Locator, CaptureError> {
        let (reply, result) = oneshot::channel();
        self.commands
            .send(Command::Capture {
                dir: self.output_dir.clone(),
                reply,
            })
            .map_err(|_| CaptureError::WorkerGone)?;

        result.await.map_err(|_| CaptureError::WorkerGone)?
    }

    /// 現在バインドされているパイプライン数（0 または 1）
    pub fn active_pipelines(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// ワーカーを停止して待機
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.commands.send(Command::Shutdown);
            if handle.join().is_err() {
                log::error!("camera worker panicked");
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}
