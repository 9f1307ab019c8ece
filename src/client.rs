//! Vision API連携モジュール
//!
//! 1回の呼び出しにつきHTTPS往復は1回のみ。リトライ・バックオフはしない。
//! 失敗はすべて `"Error: ..."` 形式の表示文字列に変換できる。

use crate::config::Config;
use crate::encoder::DataUri;
use crate::error::{RequestError, Result, SnapError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use snap_describe_common::{
    build_description_request, extract_api_error, parse_description_response, DescriptionRequest,
};
use tokio::sync::oneshot;

/// 失敗時の表示プレフィックス
pub const ERROR_PREFIX: &str = "Error: ";

/// リクエスト失敗を表示用文字列に変換
pub fn error_text(err: &RequestError) -> String {
    format!("{}{}", ERROR_PREFIX, err)
}

/// 実行中リクエストの取消トークン（所有者が保持する）
///
/// `cancel()` するか、トークンを破棄するとリクエストは放棄される
#[derive(Debug)]
pub struct CancelToken(oneshot::Sender<()>);

/// リクエスト側で待機する取消シグナル
#[derive(Debug)]
pub struct CancelSignal(oneshot::Receiver<()>);

pub fn cancel_pair() -> (CancelToken, CancelSignal) {
    let (tx, rx) = oneshot::channel();
    (CancelToken(tx), CancelSignal(rx))
}

impl CancelToken {
    pub fn cancel(self) {
        let _ = self.0.send(());
    }
}

pub struct DescriptionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    prompt: String,
    max_tokens: u32,
}

impl DescriptionClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_api_key(config, config.resolve_api_key())
    }

    pub fn with_api_key(config: &Config, api_key: String) -> Result<Self> {
        // reqwestに書き込み単独のタイムアウトはないため、全体の上限として合算する
        let total = config.connect_timeout() + config.read_timeout() + config.write_timeout();
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .timeout(total)
            .build()
            .map_err(|e| SnapError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn build_request(&self, data_uri: &DataUri) -> DescriptionRequest {
        build_description_request(data_uri.as_str(), &self.model, &self.prompt, self.max_tokens)
    }

    /// 説明文を取得（失敗は型付きエラー）
    pub async fn try_describe(&self, data_uri: &DataUri) -> std::result::Result<String, RequestError> {
        let request = self.build_request(data_uri);
        log::debug!(
            "API Request: model={} max_tokens={} image={}",
            request.model,
            request.max_tokens,
            data_uri.elided()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        log::debug!("API Response: status={} body={}", status, preview(&body));

        if !status.is_success() {
            let message = extract_api_error(&body).unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            });
            return Err(RequestError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parse_description_response(&body)?)
    }

    /// 説明文を取得（失敗は `"Error: ..."` 文字列に変換）
    pub async fn describe(&self, data_uri: &DataUri) -> String {
        match self.try_describe(data_uri).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("API Error: {}", e);
                error_text(&e)
            }
        }
    }

    /// 取消可能な説明取得
    pub async fn describe_cancellable(
        &self,
        data_uri: &DataUri,
        cancel: CancelSignal,
    ) -> std::result::Result<String, RequestError> {
        tokio::select! {
            biased;
            _ = cancel.0 => {
                log::debug!("request cancelled");
                Err(RequestError::Cancelled)
            }
            result = self.try_describe(data_uri) => result,
        }
    }
}

fn map_transport_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::Timeout(err.to_string())
    } else if err.is_decode() || err.is_body() {
        RequestError::Malformed(err.to_string())
    } else {
        RequestError::Network(err.to_string())
    }
}

fn preview(body: &str) -> String {
    body.chars().take(500).collect()
}
