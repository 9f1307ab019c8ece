//! 表示状態
//!
//! 撮影画像・ローディング表示・説明文を保持する状態機械。
//! 遷移: Idle → Capturing → Sending → Done / Failed（Done・Failedからは再度Capturingへ）

use crate::capture::CapturedImage;
use crate::client::error_text;
use crate::error::RequestError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    /// エンコード + 送信中
    Sending,
    Done(String),
    Failed(String),
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Capturing => "Capturing",
            Phase::Sending => "Sending",
            Phase::Done(_) => "Done",
            Phase::Failed(_) => "Failed",
        }
    }

    /// 撮影中または送信中
    pub fn is_busy(&self) -> bool {
        matches!(self, Phase::Capturing | Phase::Sending)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    /// 実行中のため新しい撮影を受け付けない
    #[error("処理中のため撮影を受け付けません（{0}）")]
    Busy(&'static str),

    #[error("不正な遷移: {phase} で {event}")]
    InvalidTransition {
        phase: &'static str,
        event: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub description: String,
    pub is_loading: bool,
    pub last_image: Option<CapturedImage>,
    phase: Phase,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            description: String::new(),
            is_loading: false,
            last_image: None,
            phase: Phase::Idle,
        }
    }
}

impl UiState {
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// ユーザー操作による撮影開始
    ///
    /// 実行中の撮影・送信がある間は拒否する。
    pub fn begin_capture(&mut self) -> Result<(), StateError> {
        if self.phase.is_busy() {
            return Err(StateError::Busy(self.phase.name()));
        }
        self.phase = Phase::Capturing;
        Ok(())
    }

    /// 撮影成功: 画像を差し替えてローディング開始（前回の説明文はここで破棄）
    pub fn capture_succeeded(&mut self, image: CapturedImage) -> Result<(), StateError> {
        self.ensure_phase(Phase::Capturing, "capture_succeeded")?;
        self.description.clear();
        self.last_image = Some(image);
        self.is_loading = true;
        self.phase = Phase::Sending;
        Ok(())
    }

    /// 撮影失敗: 表示は変えずにIdleへ戻す
    pub fn capture_failed(&mut self) -> Result<(), StateError> {
        self.ensure_phase(Phase::Capturing, "capture_failed")?;
        self.is_loading = false;
        self.phase = Phase::Idle;
        Ok(())
    }

    /// 説明取得の完了（成功・失敗とも同じ欄に表示）
    pub fn finish(&mut self, outcome: Result<String, RequestError>) -> Result<(), StateError> {
        self.ensure_phase(Phase::Sending, "finish")?;
        self.is_loading = false;
        self.phase = match outcome {
            Ok(text) => {
                self.description = text.clone();
                Phase::Done(text)
            }
            Err(e) => {
                let text = error_text(&e);
                self.description = text.clone();
                Phase::Failed(text)
            }
        };
        Ok(())
    }

    fn ensure_phase(&self, phase: Phase, event: &'static str) -> Result<(), StateError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(StateError::InvalidTransition {
                phase: self.phase.name(),
                event,
            })
        }
    }
}
