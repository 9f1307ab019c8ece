use super::source::FrameSource;
use crate::error::CaptureError;
use image::{DynamicImage, RgbaImage};
use kamera::Camera as KCamera;

/// kameraによる実機カメラ入力
pub struct WebcamSource {
    index: usize,
    camera: Option<KCamera>,
    rgba_buffer: Vec<u8>,
}

impl WebcamSource {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            camera: None,
            rgba_buffer: vec![],
        }
    }
}

impl FrameSource for WebcamSource {
    fn name(&self) -> String {
        format!("webcam:{}", self.index)
    }

    fn open(&mut self) -> Result<(), CaptureError> {
        if self.camera.is_some() {
            return Err(CaptureError::Busy);
        }
        let camera = KCamera::new_device(self.index)
            .ok_or_else(|| CaptureError::NoCamera(format!("camera id {} not exist", self.index)))?;
        camera.start();
        self.camera = Some(camera);
        Ok(())
    }

    fn grab(&mut self) -> Result<DynamicImage, CaptureError> {
        let camera = self
            .camera
            .as_ref()
            .ok_or_else(|| CaptureError::Frame("パイプライン未接続".into()))?;

        let frame = camera
            .wait_for_frame()
            .ok_or_else(|| CaptureError::Frame("フレーム取得失敗".into()))?;

        let (width, height) = frame.size_u32();
        if self.rgba_buffer.len() as u32 != width * height * 4 {
            self.rgba_buffer = vec![0; (width * height * 4) as usize];
        }
        let frame_data = frame.data();
        let data_u8 = frame_data.data_u8();
        // BGRA → RGBA
        for (rgba, bgra) in self.rgba_buffer.chunks_exact_mut(4).zip(data_u8.chunks_exact(4)) {
            rgba.copy_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
        }

        RgbaImage::from_raw(width, height, self.rgba_buffer.clone())
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| CaptureError::Frame(format!("フレームサイズ不正 {width}x{height}")))
    }

    fn close(&mut self) {
        if let Some(camera) = self.camera.take() {
            camera.stop();
        }
    }
}
