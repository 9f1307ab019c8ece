//! APIレスポンスパーサー
//!
//! Chat Completionsのレスポンス本文から説明文を取り出す

use crate::error::{Error, Result};
use crate::types::DescriptionResponse;
use serde::Deserialize;

/// レスポンス本文をパースして先頭choiceの本文を返す
///
/// # Returns
/// * `Ok(String)` - 先頭choiceの `message.content`
/// * `Err(Error::Parse)` - JSONとして不正
/// * `Err(Error::EmptyResponse)` - choicesが空、または本文がnull
///
/// # Examples
/// ```
/// use snap_describe_common::parse_description_response;
///
/// let body = r#"{"choices":[{"message":{"content":"A red apple on a table."}}]}"#;
/// assert_eq!(parse_description_response(body).unwrap(), "A red apple on a table.");
/// ```
pub fn parse_description_response(body: &str) -> Result<String> {
    let response: DescriptionResponse = serde_json::from_str(body)
        .map_err(|e| Error::Parse(format!("レスポンスJSONパースエラー: {}", e)))?;

    response
        .first_content()
        .map(str::to_string)
        .ok_or(Error::EmptyResponse)
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// エラーレスポンス `{"error":{"message":...}}` からメッセージを抽出
pub fn extract_api_error(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.trim().is_empty())
}
