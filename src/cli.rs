use clap::{Parser, Subcommand};
use crate::camera_backend::CameraBackend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snap-describe")]
#[command(about = "カメラで撮影した写真をVision APIで説明するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// カメラ入力 (webcam|camera/still)
    #[arg(long, default_value = "webcam", global = true)]
    pub source: CameraBackend,

    /// still入力で使う画像ファイル
    #[arg(long, global = true)]
    pub still: Option<PathBuf>,

    /// 撮影画像の保存先（設定より優先）
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話モード（Enterで撮影・説明、qで終了）
    Run,

    /// 1枚撮影して説明を表示
    Snap,

    /// 既存の画像ファイルを説明
    Describe {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定（値を省略すると入力を求める）
        #[arg(long, num_args = 0..=1)]
        set_api_key: Option<Option<String>>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
