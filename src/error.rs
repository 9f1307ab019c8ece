use thiserror::Error;

/// 撮影失敗（ログのみ。UIはIdleに戻る）
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("カメラが見つかりません: {0}")]
    NoCamera(String),

    #[error("カメラが使用中です")]
    Busy,

    #[error("フレーム取得に失敗: {0}")]
    Frame(String),

    #[error("画像保存に失敗: {0}")]
    Save(String),

    #[error("カメラワーカーが停止しています")]
    WorkerGone,
}

/// 説明リクエスト失敗（"Error: ..." として表示される）
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("timeout: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response: no description returned")]
    EmptyResponse,

    #[error("request cancelled")]
    Cancelled,
}

impl From<snap_describe_common::Error> for RequestError {
    fn from(err: snap_describe_common::Error) -> Self {
        match err {
            snap_describe_common::Error::EmptyResponse => RequestError::EmptyResponse,
            other => RequestError::Malformed(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum SnapError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像エンコードエラー: {0}")]
    Encode(String),

    #[error("撮影エラー: {0}")]
    Capture(#[from] CaptureError),

    #[error("API呼び出しエラー: {0}")]
    Request(#[from] RequestError),

    #[error("画像処理エラー: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SnapError>;
