use crate::capture::{FrameSource, StillSource};
use crate::config::Config;
use crate::error::{Result, SnapError};
use clap::ValueEnum;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CameraBackend {
    /// 実機カメラ（webcam feature）
    #[value(alias = "camera")]
    Webcam,
    /// 画像ファイルをカメラとして使う
    Still,
}

pub type SourceFactory = Box<dyn FnOnce() -> Box<dyn FrameSource> + Send>;

impl CameraBackend {
    pub fn name(&self) -> &'static str {
        match self {
            CameraBackend::Webcam => "webcam",
            CameraBackend::Still => "still",
        }
    }

    /// カメラワーカー上で入力を生成するファクトリ
    pub fn factory(&self, config: &Config, still: Option<PathBuf>) -> Result<SourceFactory> {
        match self {
            CameraBackend::Still => {
                let path = still.ok_or_else(|| {
                    SnapError::Config("still入力には --still <画像ファイル> が必要です".into())
                })?;
                Ok(Box::new(move || Box::new(StillSource::new(path)) as Box<dyn FrameSource>))
            }
            #[cfg(feature = "webcam")]
            CameraBackend::Webcam => {
                let index = config.camera_index;
                Ok(Box::new(move || {
                    Box::new(crate::capture::WebcamSource::new(index)) as Box<dyn FrameSource>
                }))
            }
            #[cfg(not(feature = "webcam"))]
            CameraBackend::Webcam => {
                let _ = config;
                Err(SnapError::Config(
                    "webcam入力は無効です（--features webcam でビルドしてください）".into(),
                ))
            }
        }
    }
}
