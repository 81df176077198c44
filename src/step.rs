//! ステップ抽象化レイヤー
//!
//! # 責務
//!
//! - すべてのステップ種別に共通するインターフェース [`Step`] トレイトを定義
//! - ステップの共通属性（ID・表示名・コンテキスト・親子リンク）を保持する
//!   [`StepMeta`] を提供
//! - ステップ種別に応じたインスタンスを生成するレジストリ機能
//!
//! # ライフサイクルプロトコル
//!
//! ステップは4つの非同期フックを持ちます。
//!
//! - [`Step::can_close`] - ステップを離れてよいかの判定（状態を変更しない述語）
//! - [`Step::close`] - ステップを離れる際のフック。`false` で遷移を拒否
//! - [`Step::activate`] - ステップがアクティブになる際のフック。`false` で遷移を拒否
//! - [`Step::can_revert`] - 完了済みステップを再オープンしてよいかの判定
//!
//! `close` / `activate` はデフォルトで対応する述語に委譲します。
//! 呼び出し側（親タイムライン）はフックを順番に await し、ひとつの遷移の中では
//! `close` の解決が完了してから `activate` が開始されます。
//!
//! # モジュール構成
//!
//! - `external` - 外部ステップ（追加の振る舞いを持たない具象リーフ）
//! - `registry` - ステップ種別からコンストラクタを引くレジストリ
//!
//! # 使用例
//!
//! ```rust,no_run
//! use stepline::config::StepConfig;
//! use stepline::step::{Step, StepRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StepConfig::from_file("timelines/example.toml")?;
//!     let registry = StepRegistry::with_builtins();
//!
//!     let step = registry.create(&config).map_err(|errors| {
//!         errors
//!             .into_iter()
//!             .map(|e| e.to_string())
//!             .collect::<Vec<_>>()
//!             .join("\n")
//!     })?;
//!
//!     println!("構築したステップ: {} ({})", step.label(), step.step_type());
//!     Ok(())
//! }
//! ```

pub mod external;
pub mod registry;

// 公開APIの再エクスポート
pub use external::ExternalStep;
pub use registry::{StepConstructor, StepRegistry};

use async_trait::async_trait;

use crate::config::{StepConfig, StepContext};
use crate::timeline::Timeline;

/// ステップの共通属性
///
/// # フィールド
///
/// - `id`: 兄弟の中で一意な ID。再構築をまたいで安定していること
/// - `label`: 表示名
/// - `context`: 任意のコンテキスト
/// - `parent` / `previous` / `next`: 親タイムラインおよび前後の兄弟ステップの ID。
///   所有権を持たないリンクで、実体は親タイムライン経由で解決する
#[derive(Debug, Clone)]
pub struct StepMeta {
    /// ステップの ID
    pub id: String,

    /// 表示名
    pub label: String,

    /// 任意のコンテキスト
    pub context: StepContext,

    /// 親タイムラインの ID。ルートステップの場合は `None`
    pub parent: Option<String>,

    /// 同じタイムライン内の直前のステップの ID。先頭の場合は `None`
    pub previous: Option<String>,

    /// 同じタイムライン内の直後のステップの ID。末尾の場合は `None`
    pub next: Option<String>,
}

impl StepMeta {
    /// 設定から共通属性を生成
    ///
    /// リンク（`parent` / `previous` / `next`）は親タイムラインの構築時に
    /// 配線されるため、この時点ではすべて `None` です。
    pub fn from_config(config: &StepConfig) -> Self {
        Self {
            id: config.id.clone(),
            label: config.label.clone(),
            context: config.context.clone(),
            parent: None,
            previous: None,
            next: None,
        }
    }
}

/// ステップの共通インターフェース
///
/// すべてのステップ種別が実装するトレイトです。遷移の可否はフックの
/// 戻り値（`bool`）で表現され、`false` は「遷移しない」という正常な
/// 否定結果であってエラーではありません。理由の診断は具象バリアント側の
/// 責務です。
#[async_trait]
pub trait Step: Send + Sync {
    /// 共通属性への参照
    fn meta(&self) -> &StepMeta;

    /// 共通属性への可変参照
    ///
    /// 親タイムラインが構築時にリンクを配線するために使用します。
    fn meta_mut(&mut self) -> &mut StepMeta;

    /// ステップ種別の識別子
    fn step_type(&self) -> &str;

    /// ステップの ID
    fn id(&self) -> &str {
        &self.meta().id
    }

    /// 表示名
    fn label(&self) -> &str {
        &self.meta().label
    }

    /// コンテキスト
    fn context(&self) -> &StepContext {
        &self.meta().context
    }

    /// タイムラインへのダウンキャスト
    fn as_timeline(&self) -> Option<&Timeline> {
        None
    }

    /// タイムラインへの可変ダウンキャスト
    fn as_timeline_mut(&mut self) -> Option<&mut Timeline> {
        None
    }

    /// ステップを完了扱いにして親タイムラインが先へ進んでよいか
    ///
    /// 状態を変更しない純粋な述語です。デフォルトは `true`。
    async fn can_close(&self) -> bool {
        true
    }

    /// 親タイムラインが別のステップへ移る際に呼ばれるフック
    ///
    /// デフォルトでは [`Step::can_close`] に委譲します。具象バリアントは
    /// 離脱時の副作用（状態の保存など）を追加できます。
    ///
    /// # 引数
    ///
    /// - `is_revert`: タイムラインが前のステップを再オープンするために
    ///   閉じられる場合に `true`。破壊的な副作用のスキップ判断に使える
    ///
    /// # 戻り値
    ///
    /// `false` の場合、呼び出し側は遷移を中断しなければなりません。
    async fn close(&self, is_revert: bool) -> bool {
        let _ = is_revert;
        self.can_close().await
    }

    /// ステップが親タイムラインのアクティブステップになる際に呼ばれるフック
    ///
    /// デフォルトでは、`is_revert` が `true` の場合にまず [`Step::can_revert`] を
    /// 確認し、拒否されたら具象バリアントの副作用が動く前に `false` を返します。
    ///
    /// # 引数
    ///
    /// - `is_revert`: 一度完了したステップの再オープンとしてアクティブ化される
    ///   場合に `true`
    ///
    /// # 戻り値
    ///
    /// `false` の場合、呼び出し側は遷移を中断しなければなりません。
    async fn activate(&self, is_revert: bool) -> bool {
        if is_revert && !self.can_revert().await {
            return false;
        }

        true
    }

    /// 完了済みのステップへタイムラインが戻ってよいか
    ///
    /// 一度きりで再訪できないステップは `false` を返します。デフォルトは `true`。
    async fn can_revert(&self) -> bool {
        true
    }
}
