//! Stepline - 合成可能なステップライフサイクル
//!
//! 離散的な単位（ステップ）の順序付きプロセスを表現するライブラリです。
//! ステップは外部作業のリーフにも、サブステップの順序列を持つタイムラインにも
//! なれます。ウィザードやガイド付きプロセスのような多段ワークフローを
//! モデル化し、前進と、以前のステップへの巻き戻しをサポートします。
//! 各ステップは自分を離れてよいか・再入してよいかを自身で制御します。
//!
//! # モジュール構成
//!
//! - [`config`]: 宣言的なステップツリー設定（TOML / JSON）
//! - [`error`]: エラー型とエラー集約の仕組み
//! - [`step`]: ステップの共通インターフェースとレジストリ
//! - [`timeline`]: 子ステップを所有する複合ステップとナビゲーション
//!
//! # 使用例
//!
//! ```rust,no_run
//! use stepline::config::StepConfig;
//! use stepline::step::StepRegistry;
//! use stepline::timeline::Timeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. 設定を読み込む
//!     let config = StepConfig::from_file("timelines/example.toml")?;
//!
//!     // 2. レジストリ経由でステップツリーを構築する
//!     let registry = StepRegistry::with_builtins();
//!     let mut timeline = Timeline::from_config(&config, &registry)
//!         .map_err(|errors| errors[0].to_string())?;
//!
//!     // 3. ナビゲーションを駆動する
//!     while timeline.advance().await {
//!         println!("アクティブステップ: {}", timeline.active_step());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod step;
pub mod timeline;

// 公開APIの再エクスポート
pub use config::{StepConfig, StepContext, TimelineEntryConfig};
pub use error::{ConfigError, ErrorCollector, Failable, StepError};
pub use step::{ExternalStep, Step, StepConstructor, StepMeta, StepRegistry};
pub use timeline::{Timeline, TimelineStep};
