use crate::error::CaptureError;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// カメラ入力の抽象
///
/// `open` でパイプラインを確保し、`close` で解放する。
/// 実装はカメラワーカースレッド上で生成・使用されるため `Send` は不要。
pub trait FrameSource {
    fn name(&self) -> String;

    fn open(&mut self) -> Result<(), CaptureError>;

    fn grab(&mut self) -> Result<DynamicImage, CaptureError>;

    fn close(&mut self);
}

/// ファイルを1枚のカメラとして扱う入力
///
/// フレーム取得のたびに画像ファイルを読み直す（ヘッドレス環境・テスト用）
pub struct StillSource {
    path: PathBuf,
    opened: bool,
}

impl StillSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            opened: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for StillSource {
    fn name(&self) -> String {
        format!("still:{}", self.path.display())
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        if !self.path.is_file() {
            return Err(CaptureError::NoCamera(self.path.display().to_string()));
        }
        self.opened = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<DynamicImage, CaptureError> {
        if !self.opened {
            return Err(CaptureError::Frame("パイプライン未接続".into()));
        }
        image::open(&self.path).map_err(|e| CaptureError::Frame(e.to_string()))
    }

    fn close(&mut self) {
        self.opened = false;
    }
}
