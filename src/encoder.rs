//! 画像エンコーダ
//!
//! 保存済み画像をデコードし、PNG（可逆）で再エンコードして
//! `data:image/png;base64,...` 形式のData URIにする。サイズ上限はない。

use crate::error::{Result, SnapError};
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Data URI文字列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri(String);

impl DataUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// base64部分
    pub fn payload(&self) -> &str {
        self.0.split_once(',').map(|(_, data)| data).unwrap_or("")
    }

    /// base64部分をデコードしたバイト列
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        general_purpose::STANDARD
            .decode(self.payload())
            .map_err(|e| SnapError::Encode(format!("base64デコード失敗: {}", e)))
    }

    /// ログ出力用の短縮表現
    pub fn elided(&self) -> String {
        format!("{}<{} chars>", PNG_DATA_URI_PREFIX, self.payload().len())
    }
}

impl std::fmt::Display for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 任意形式の画像バイト列をPNG Data URIに変換
pub fn encode(raw: &[u8]) -> Result<DataUri> {
    let image = image::load_from_memory(raw)?;
    encode_image(&image)
}

/// デコード済みラスタをPNG Data URIに変換
pub fn encode_image(image: &DynamicImage) -> Result<DataUri> {
    let png = to_png_bytes(image)?;
    Ok(png_data_uri(&png))
}

/// ラスタをPNGバイト列に変換
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

/// PNGバイト列をそのままData URIにする
pub fn png_data_uri(png: &[u8]) -> DataUri {
    let encoded = general_purpose::STANDARD.encode(png);
    DataUri(format!("{}{}", PNG_DATA_URI_PREFIX, encoded))
}
