//! カメラワーカー
//!
//! カメラI/O専用のスレッドを1本だけ持ち、コマンドを順に処理する。
//! 起動時に生成し、終了時に一度だけ停止する（撮影ごとのスレッド生成はしない）。

use super::source::FrameSource;
use super::Locator;
use crate::error::CaptureError;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

const PREVIEW_INTERVAL: Duration = Duration::from_millis(100);

pub(super) enum Command {
    BindPreview(Sender<RgbaImage>),
    Capture {
        dir: PathBuf,
        reply: oneshot::Sender<Result<Locator, CaptureError>>,
    },
    Unbind,
    Shutdown,
}

/// 現在のパイプライン構成
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    None,
    Preview,
    PreviewAndCapture,
}

pub(super) struct Worker {
    source: Box<dyn FrameSource>,
    binding: Binding,
    preview: Option<Sender<RgbaImage>>,
    active: Arc<AtomicUsize>,
    preview_frames: u64,
}

impl Worker {
    pub(super) fn new(source: Box<dyn FrameSource>, active: Arc<AtomicUsize>) -> Self {
        Self {
            source,
            binding: Binding::None,
            preview: None,
            active,
            preview_frames: 0,
        }
    }

    pub(super) fn run(mut self, commands: Receiver<Command>) {
        log::debug!("camera worker started: {}", self.source.name());

        loop {
            let command = if self.binding != Binding::None && self.preview.is_some() {
                match commands.recv_timeout(PREVIEW_INTERVAL) {
                    Ok(c) => c,
                    Err(RecvTimeoutError::Timeout) => {
                        self.pump_preview();
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            } else {
                match commands.recv() {
                    Ok(c) => c,
                    Err(_) => break,
                }
            };

            match command {
                Command::BindPreview(sink) => {
                    self.preview = Some(sink);
                    if let Err(e) = self.rebind(Binding::Preview) {
                        log::error!("Use case binding failed: {}", e);
                    }
                }
                Command::Capture { dir, reply } => {
                    let result = self.capture_to(&dir);
                    match &result {
                        Ok(locator) => log::info!("Photo capture succeeded: {}", locator),
                        Err(e) => log::error!("Photo capture failed: {}", e),
                    }
                    if reply.send(result).is_err() {
                        log::debug!("capture result dropped (caller gone)");
                    }
                }
                Command::Unbind => self.unbind_all(),
                Command::Shutdown => break,
            }
        }

        self.unbind_all();
        log::debug!("camera worker stopped ({} preview frames)", self.preview_frames);
    }

    /// 既存のバインドを必ず解除してから再バインド
    fn rebind(&mut self, binding: Binding) -> Result<(), CaptureError> {
        self.unbind_all();
        self.source.open()?;
        self.active.fetch_add(1, Ordering::SeqCst);
        self.binding = binding;
        log::debug!("Use case binding successful: {:?}", binding);
        Ok(())
    }

    fn unbind_all(&mut self) {
        if self.binding != Binding::None {
            self.source.close();
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.binding = Binding::None;
        }
    }

    fn capture_to(&mut self, dir: &Path) -> Result<Locator, CaptureError> {
        self.rebind(Binding::PreviewAndCapture)?;
        let frame = self.source.grab()?;
        let path = unique_photo_path(dir, chrono::Utc::now().timestamp_millis());
        log::debug!("Photo file: {}", path.display());
        save_jpeg(&frame.to_rgb8(), &path)?;
        Ok(Locator::new(path))
    }

    fn pump_preview(&mut self) {
        let Some(sink) = &self.preview else {
            return;
        };
        match self.source.grab() {
            Ok(frame) => {
                if sink.send(frame.to_rgba8()).is_err() {
                    log::debug!("preview consumer gone");
                    self.preview = None;
                } else {
                    self.preview_frames += 1;
                }
            }
            Err(e) => log::warn!("preview frame failed: {}", e),
        }
    }
}

/// `<epoch-millis>.jpg`。同一ミリ秒の衝突時は次の値を使う
pub(super) fn unique_photo_path(dir: &Path, millis: i64) -> PathBuf {
    let mut stamp = millis;
    loop {
        let path = dir.join(format!("{}.jpg", stamp));
        if !path.exists() {
            return path;
        }
        stamp += 1;
    }
}

/// 一時ファイルに書いてからリネーム（失敗時にファイルを残さない）
fn save_jpeg(image: &image::RgbImage, path: &Path) -> Result<(), CaptureError> {
    let partial = path.with_extension("jpg.part");
    let result = image
        .save_with_format(&partial, image::ImageFormat::Jpeg)
        .map_err(|e| CaptureError::Save(e.to_string()))
        .and_then(|_| {
            std::fs::rename(&partial, path).map_err(|e| CaptureError::Save(e.to_string()))
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }
    result
}
