//! リクエスト生成モジュール
//!
//! 1枚の画像につき1メッセージ（テキスト指示 → 画像の順）のリクエストを組み立てる

use crate::types::{Content, DescriptionRequest, ImageUrl, Message, Role};

/// 既定モデル
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// 応答トークン上限（サーバー側で適用される）
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// 画像説明の指示文
pub const DESCRIBE_PROMPT: &str = "Please describe what is in this image.";

/// 画像説明リクエストを生成
///
/// # Arguments
/// * `data_uri` - `data:image/png;base64,...` 形式のData URI
/// * `model` - モデル名
/// * `prompt` - テキスト指示
/// * `max_tokens` - 応答トークン上限
///
/// # Examples
/// ```
/// use snap_describe_common::{build_description_request, DEFAULT_MODEL, DESCRIBE_PROMPT};
///
/// let request = build_description_request("data:image/png;base64,AAAA", DEFAULT_MODEL, DESCRIBE_PROMPT, 300);
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.messages[0].content.len(), 2);
/// ```
pub fn build_description_request(
    data_uri: &str,
    model: &str,
    prompt: &str,
    max_tokens: u32,
) -> DescriptionRequest {
    let text = Content::Text { text: prompt.to_string() };
    let image = Content::ImageUrl {
        image_url: ImageUrl { url: data_uri.to_string() },
    };

    DescriptionRequest {
        model: model.to_string(),
        messages: vec![Message {
            role: Role::User,
            content: vec![text, image],
        }],
        max_tokens,
    }
}
