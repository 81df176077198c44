//! Stepline CLI
//!
//! ステップ設定の検証・表示と、タイムラインのナビゲーション実行を行う
//! 小さな点検用バイナリです。構築とナビゲーションのコアは
//! ライブラリ側（[`stepline`]）にあります。

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;

use stepline::config::StepConfig;
use stepline::step::{Step, StepRegistry};

#[derive(Parser)]
#[command(name = "stepline", version, about = "合成可能なステップライフサイクルの点検ツール")]
struct Cli {
    /// 構造化ログ（JSON）の出力先ファイル。未指定なら標準エラーに出力
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 設定を読み込んでステップツリーを構築し、全エラーを報告する
    Validate {
        /// ステップ設定（TOML）のパス
        file: PathBuf,
    },

    /// 構築したステップツリーを表示する
    Show {
        /// ステップ設定（TOML）のパス
        file: PathBuf,
    },

    /// 拒否されるまでルートタイムラインを前進させる
    Run {
        /// ステップ設定（TOML）のパス
        file: PathBuf,
    },
}

/// トレーシングの初期化
///
/// ログファイルが指定された場合は JSON 形式で非同期書き込みし、
/// 返されたガードを main の終わりまで保持します。
fn init_tracing(log_file: Option<&Path>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    match log_file {
        Some(path) => {
            let log_dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let log_filename = path.file_name().unwrap_or_else(|| OsStr::new("stepline.log"));

            let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .json()
                .with_writer(non_blocking)
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .init();

            None
        }
    }
}

/// 設定ファイルからステップツリーを構築する
///
/// 失敗した場合は集約されたエラーをすべて標準エラーへ出力します。
fn build_tree(file: &Path) -> Result<Box<dyn Step>, ExitCode> {
    let config = match StepConfig::from_file(file) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return Err(ExitCode::FAILURE);
        }
    };

    let registry = StepRegistry::with_builtins();

    match registry.create(&config) {
        Ok(step) => Ok(step),
        Err(errors) => {
            for error in &errors {
                eprintln!("{error}");
            }
            Err(ExitCode::FAILURE)
        }
    }
}

/// ステップツリーを1ノード1行で表示する
///
/// タイムラインの子は duration 付きで、アクティブな子には `*` を付けます。
fn print_tree(step: &dyn Step, duration: Option<f64>, active: bool, indent: usize) {
    let marker = if active { "*" } else { " " };
    let duration = duration
        .map(|value| format!(" duration={value}"))
        .unwrap_or_default();

    println!(
        "{}{marker} {} ({}) {}{duration}",
        "  ".repeat(indent),
        step.id(),
        step.step_type(),
        step.label(),
    );

    if let Some(timeline) = step.as_timeline() {
        for entry in timeline.steps() {
            print_tree(
                entry.step.as_ref(),
                Some(entry.duration),
                entry.step.id() == timeline.active_step(),
                indent + 1,
            );
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_deref());

    match cli.command {
        Command::Validate { file } => match build_tree(&file) {
            Ok(step) => {
                println!("OK: {} ({})", step.id(), step.step_type());
                ExitCode::SUCCESS
            }
            Err(code) => code,
        },
        Command::Show { file } => match build_tree(&file) {
            Ok(step) => {
                print_tree(step.as_ref(), None, false, 0);
                ExitCode::SUCCESS
            }
            Err(code) => code,
        },
        Command::Run { file } => {
            let mut step = match build_tree(&file) {
                Ok(step) => step,
                Err(code) => return code,
            };

            let root_id = step.id().to_string();
            let Some(timeline) = step.as_timeline_mut() else {
                eprintln!("ルートステップ {root_id} はタイムラインではありません");
                return ExitCode::FAILURE;
            };

            info!(id = %timeline.id(), active_step = %timeline.active_step(), "ナビゲーションを開始");

            while timeline.advance().await {
                info!(active_step = %timeline.active_step(), "前進しました");
            }

            println!("終端に到達しました: {}", timeline.active_step());
            ExitCode::SUCCESS
        }
    }
}
