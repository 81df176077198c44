//! タイムライン
//!
//! # 責務
//!
//! - 子ステップの順序付きリストを所有する複合ステップ [`Timeline`] を提供
//! - 設定ツリーからの再帰的な構築と、失敗の一括集約
//! - アクティブステップの前進・巻き戻しナビゲーション
//!
//! # 構築フロー
//!
//! 1. 設定の子ステップをレジストリ経由で1つずつ構築する
//!    （途中で失敗しても打ち切らず、全子ステップを試行する）
//! 2. 失敗が1件でもあれば [`StepError::TimelineInit`] として一括報告し、
//!    インスタンスは生成されない
//! 3. 成功したら親・前後リンクを配線し、アクティブステップを確定する
//!
//! # ナビゲーション
//!
//! 前進・巻き戻しのトリガータイミングはコアでは決めず、組み込み側が
//! [`Timeline::advance`] / [`Timeline::revert`] を呼び出します。ひとつの遷移では
//! アクティブステップの `close` が完全に解決してから対象の `activate` が
//! 開始され、両方が肯定を返した場合にのみアクティブステップが更新されます。
//!
//! 同一タイムラインに対するナビゲーション呼び出しの直列化は組み込み側の
//! 責務です（コアはロックを持ちません）。
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
//!     let config = StepConfig::from_file("timelines/example.toml")?;
//!     let registry = StepRegistry::with_builtins();
//!
//!     let mut timeline = Timeline::from_config(&config, &registry)
//!         .map_err(|errors| errors[0].to_string())?;
//!
//!     // 拒否されるまで前進する
//!     while timeline.advance().await {
//!         println!("アクティブステップ: {}", timeline.active_step());
//!     }
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::StepConfig;
use crate::error::{ErrorCollector, Failable, StepError};
use crate::step::{Step, StepMeta, StepRegistry};

/// タイムラインのステップ種別識別子
pub const STEP_TYPE: &str = "Timeline";

/// タイムラインの子ステップ
///
/// 構築済みのステップと、そのステップに割り当てられた duration の組です。
/// タイムラインが子ステップを排他的に所有します。
pub struct TimelineStep {
    /// 構築済みの子ステップ
    pub step: Box<dyn Step>,

    /// 割り当てられた duration（コアでは解釈しない）
    pub duration: f64,
}

/// 順序付きの子ステップを所有する複合ステップ
///
/// 構築は設定から一度だけ行われ、部分的に構築された状態は存在しません。
/// 構築後に変化するのは `active_step` のみで、その書き換えは
/// ナビゲーションメソッドだけが行います。
pub struct Timeline {
    meta: StepMeta,
    steps: Vec<TimelineStep>,
    active_step: String,
}

impl Timeline {
    /// 設定からタイムラインを構築
    ///
    /// 子ステップの構築は [`StepRegistry`] に委譲されます。子がタイムライン種別の
    /// 場合は同じレジストリで再帰的に構築されるため、ネストした失敗は外側の
    /// 集約の中で1件として現れます。
    ///
    /// # 戻り値
    ///
    /// - `Ok(Timeline)`: 全子ステップの構築に成功した場合
    /// - `Err(errors)`: 子ステップが空なら [`StepError::EmptyTimeline`]、
    ///   それ以外の失敗は子エラーをすべて抱えた [`StepError::TimelineInit`] が
    ///   1件だけ入ります
    pub fn from_config(config: &StepConfig, registry: &StepRegistry) -> Failable<Self> {
        let meta = StepMeta::from_config(config);

        // 子が空だとデフォルトのアクティブステップを決められない
        if config.steps.is_empty() {
            return Err(vec![StepError::EmptyTimeline {
                id: config.id.clone(),
            }]);
        }

        let mut collector = ErrorCollector::new();
        let mut steps = Vec::with_capacity(config.steps.len());

        // 先行する失敗に関わらず全子ステップを試行する（集約方針）
        for entry in &config.steps {
            match registry.create(&entry.step) {
                Ok(step) => steps.push(TimelineStep {
                    step,
                    duration: entry.duration,
                }),
                Err(errors) => collector.extend(errors),
            }
        }

        let active_step = match &config.active_step {
            Some(id) => {
                if collector.is_empty() && !steps.iter().any(|entry| entry.step.id() == id) {
                    collector.push(StepError::UnknownActiveStep {
                        id: config.id.clone(),
                        active_step: id.clone(),
                    });
                }
                id.clone()
            }
            None => steps
                .first()
                .map(|entry| entry.step.id().to_string())
                .unwrap_or_default(),
        };

        if !collector.is_empty() {
            return Err(vec![StepError::TimelineInit {
                id: config.id.clone(),
                errors: collector.into_errors(),
            }]);
        }

        let mut timeline = Self {
            meta,
            steps,
            active_step,
        };
        timeline.wire_links();

        debug!(
            id = %timeline.meta.id,
            steps = timeline.steps.len(),
            active_step = %timeline.active_step,
            "タイムラインを構築"
        );

        Ok(timeline)
    }

    /// 全子ステップの親・前後リンクを配線する
    fn wire_links(&mut self) {
        let ids: Vec<String> = self
            .steps
            .iter()
            .map(|entry| entry.step.id().to_string())
            .collect();
        let parent = self.meta.id.clone();

        for (index, entry) in self.steps.iter_mut().enumerate() {
            let meta = entry.step.meta_mut();
            meta.parent = Some(parent.clone());
            meta.previous = index.checked_sub(1).map(|i| ids[i].clone());
            meta.next = ids.get(index + 1).cloned();
        }
    }

    /// 子ステップの順序付きリスト
    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    /// 現在アクティブな子ステップの ID
    pub fn active_step(&self) -> &str {
        &self.active_step
    }

    /// 現在アクティブな子ステップ
    pub fn active(&self) -> &dyn Step {
        self.step(&self.active_step)
            .expect("activeStep は構築時とナビゲーション時に検証済み")
    }

    /// ID から子ステップを引く
    pub fn step(&self, id: &str) -> Option<&dyn Step> {
        self.steps
            .iter()
            .find(|entry| entry.step.id() == id)
            .map(|entry| entry.step.as_ref())
    }

    /// ID から子ステップを引く（可変）
    pub fn step_mut(&mut self, id: &str) -> Option<&mut Box<dyn Step>> {
        self.steps
            .iter_mut()
            .find(|entry| entry.step.id() == id)
            .map(|entry| &mut entry.step)
    }

    /// ID から子ステップの位置（0始まり）を引く
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|entry| entry.step.id() == id)
    }

    /// アクティブステップの次の兄弟へ前進する
    ///
    /// 次の兄弟がいない場合（末尾、または子が1つだけ）は副作用なしで
    /// `false` を返します。タイムライン自身の完了をどう扱うかは、この
    /// タイムラインをステップとして持つ親側の close / activate の関心事です。
    pub async fn advance(&mut self) -> bool {
        let Some(target) = self.active().meta().next.clone() else {
            debug!(id = %self.meta.id, active_step = %self.active_step, "次のステップがないため前進しません");
            return false;
        };

        self.attempt_transition(&target, false).await
    }

    /// 指定した子ステップへ前進する
    ///
    /// 隣接していない子ステップへのジャンプも許可されます。
    pub async fn advance_to(&mut self, target_id: &str) -> bool {
        self.attempt_transition(target_id, false).await
    }

    /// アクティブステップの前の兄弟へ巻き戻す
    ///
    /// close / activate の両フックに `is_revert = true` が渡され、対象の
    /// アクティブ化は [`Step::can_revert`] で追加的にゲートされます。
    pub async fn revert(&mut self) -> bool {
        let Some(target) = self.active().meta().previous.clone() else {
            debug!(id = %self.meta.id, active_step = %self.active_step, "前のステップがないため巻き戻しません");
            return false;
        };

        self.attempt_transition(&target, true).await
    }

    /// 指定した子ステップへ巻き戻す
    pub async fn revert_to(&mut self, target_id: &str) -> bool {
        self.attempt_transition(target_id, true).await
    }

    /// アクティブステップから対象ステップへの遷移を試行する
    ///
    /// アクティブステップの `close` が完全に解決してから対象の `activate` を
    /// 開始します。どちらかが `false` を返した時点で遷移は中断され、
    /// `active_step` は変更されません。両方が成功した場合にのみ確定します。
    async fn attempt_transition(&mut self, target_id: &str, is_revert: bool) -> bool {
        let Some(target) = self.step(target_id) else {
            warn!(id = %self.meta.id, target = %target_id, "遷移先の子ステップが見つかりません");
            return false;
        };
        let target_id = target.id().to_string();

        if !self.active().close(is_revert).await {
            debug!(
                id = %self.meta.id,
                active_step = %self.active_step,
                is_revert,
                "アクティブステップが close を拒否したため遷移を中断"
            );
            return false;
        }

        // self.step は遷移中に変化しないため、close 後も対象は必ず存在する
        let Some(target) = self.step(&target_id) else {
            return false;
        };

        if !target.activate(is_revert).await {
            debug!(
                id = %self.meta.id,
                target = %target_id,
                is_revert,
                "対象ステップが activate を拒否したため遷移を中断"
            );
            return false;
        }

        debug!(
            id = %self.meta.id,
            from = %self.active_step,
            to = %target_id,
            is_revert,
            "アクティブステップを遷移"
        );
        self.active_step = target_id;

        true
    }
}

#[async_trait]
impl Step for Timeline {
    fn meta(&self) -> &StepMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut StepMeta {
        &mut self.meta
    }

    fn step_type(&self) -> &str {
        STEP_TYPE
    }

    fn as_timeline(&self) -> Option<&Timeline> {
        Some(self)
    }

    fn as_timeline_mut(&mut self) -> Option<&mut Timeline> {
        Some(self)
    }
}
