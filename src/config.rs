use crate::error::{Result, SnapError};
use serde::{Deserialize, Serialize};
use snap_describe_common::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DESCRIBE_PROMPT};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
const APP_DIR_NAME: &str = "snap-describe";

/// 起動時に一度だけ構築し、各コンポーネントへ渡す設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// 撮影画像の保存先（未指定ならメディアディレクトリ）
    pub output_dir: Option<PathBuf>,
    pub camera_index: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.into(),
            endpoint: OPENAI_ENDPOINT.into(),
            prompt: DESCRIBE_PROMPT.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            write_timeout_secs: 30,
            output_dir: None,
            camera_index: 0,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SnapError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join(APP_DIR_NAME).join("config.json"))
    }

    /// APIキーを解決（環境変数を優先）
    ///
    /// 未設定でもエラーにはしない。空のキーで送信し、リモート側で失敗させる。
    pub fn resolve_api_key(&self) -> String {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return key;
            }
        }

        match &self.api_key {
            Some(key) => key.clone(),
            None => {
                log::warn!("APIキーが未設定です（{} または config --set-api-key）", API_KEY_ENV);
                String::new()
            }
        }
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    /// 撮影画像の保存先を決定して作成
    ///
    /// 優先順位: 設定値 → `<data_dir>/snap-describe/media` → `~/.snap-describe` → 一時ディレクトリ
    pub fn output_directory(&self) -> PathBuf {
        let candidates = self
            .output_dir
            .clone()
            .into_iter()
            .chain(dirs::data_dir().map(|d| d.join(APP_DIR_NAME).join("media")))
            .chain(dirs::home_dir().map(|h| h.join(format!(".{}", APP_DIR_NAME))));

        for dir in candidates {
            match std::fs::create_dir_all(&dir) {
                Ok(()) => return dir,
                Err(e) => log::warn!("保存先を作成できません {}: {}", dir.display(), e),
            }
        }

        std::env::temp_dir()
    }
}
