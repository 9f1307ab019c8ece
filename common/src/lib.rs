//! snap-describe Common Library
//!
//! Vision APIとのやり取りで使う型とユーティリティ（I/Oなし）

pub mod error;
pub mod parser;
pub mod prompts;
pub mod types;

pub use error::{Error, Result};
pub use parser::{extract_api_error, parse_description_response};
pub use prompts::{
    build_description_request, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DESCRIBE_PROMPT,
};
pub use types::{
    ChoiceMessage, Choice, Content, DescriptionRequest, DescriptionResponse, ImageUrl, Message,
    Role,
};
