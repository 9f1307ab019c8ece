//! Chat Completions APIの型定義
//!
//! - DescriptionRequest: 送信するリクエスト（モデル、メッセージ、トークン上限）
//! - DescriptionResponse: 受信するレスポンス（choices）

use serde::{Deserialize, Serialize};

/// Vision APIリクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
}

/// メッセージ（ロール + コンテンツパート列）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// コンテンツパート
///
/// `{"type":"text","text":...}` または `{"type":"image_url","image_url":{"url":...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Vision APIレスポンス
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescriptionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    /// 拒否応答などでnullになることがある
    #[serde(default)]
    pub content: Option<String>,
}

impl DescriptionResponse {
    /// 先頭choiceの本文
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}
