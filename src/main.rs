use anyhow::Context;
use clap::Parser;
use snap_describe::{app, capture, cli, client, config, encoder};
use app::{App, TerminalRenderer};
use capture::CaptureSession;
use cli::{Cli, Commands};
use client::DescriptionClient;
use config::Config;

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = Config::load().context("設定の読み込みに失敗")?;
    if let Some(dir) = cli.output_dir.clone() {
        config.output_dir = Some(dir);
    }

    match &cli.command {
        Commands::Run => {
            println!("📸 snap-describe - 対話モード\n");

            let session = start_session(&cli, &config)?;
            let (preview_tx, preview_rx) = std::sync::mpsc::channel::<image::RgbaImage>();
            session.bind_preview(preview_tx)?;
            // プレビュー表示先はないためフレームは破棄する
            std::thread::spawn(move || {
                for frame in preview_rx {
                    log::trace!("preview frame {}x{}", frame.width(), frame.height());
                }
            });

            let client = DescriptionClient::new(&config)?;
            app::run_interactive(App::new(session, client, TerminalRenderer::default())).await?;
        }

        Commands::Snap => {
            let session = start_session(&cli, &config)?;
            let client = DescriptionClient::new(&config)?;
            let mut app = App::new(session, client, TerminalRenderer::default());

            app.capture_and_describe().await?;
            if app.state().last_image.is_none() {
                eprintln!("撮影に失敗しました（詳細は --verbose のログを参照）");
            }
            app.shutdown();
        }

        Commands::Describe { image } => {
            let raw = std::fs::read(image)
                .with_context(|| format!("read {}", image.display()))?;
            let data_uri = encoder::encode(&raw)?;
            let client = DescriptionClient::new(&config)?;

            let spinner = indicatif::ProgressBar::new_spinner();
            spinner.set_message("説明を取得中...");
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));
            let description = client.describe(&data_uri).await;
            spinner.finish_and_clear();

            println!("{}", description);
        }

        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key.clone() {
                let key = match key {
                    Some(k) => k,
                    None => dialoguer::Password::new()
                        .with_prompt("OpenAI APIキー")
                        .interact()
                        .context("APIキーの入力に失敗")?,
                };
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if *show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  エンドポイント: {}", config.endpoint);
                println!("  最大トークン: {}", config.max_tokens);
                println!(
                    "  タイムアウト: 接続{}s / 読込{}s / 書込{}s",
                    config.connect_timeout_secs, config.read_timeout_secs, config.write_timeout_secs
                );
                println!("  保存先: {}", config.output_directory().display());
                println!("  カメラ番号: {}", config.camera_index);
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn start_session(cli: &Cli, config: &Config) -> anyhow::Result<CaptureSession> {
    let factory = cli.source.factory(config, cli.still.clone())?;
    let output_dir = config.output_directory();
    log::info!("camera: {} / output: {}", cli.source.name(), output_dir.display());
    Ok(CaptureSession::start(factory, output_dir)?)
}
