//! ステップレジストリ
//!
//! # 責務
//!
//! - ステップ種別の識別子から対応するコンストラクタを引くルックアップテーブルを提供
//! - 設定を受け取り、種別に応じた具象ステップを生成するファクトリー機能
//! - 新しいステップ種別の登録による拡張ポイント
//!
//! # 拡張方法
//!
//! 新しいリーフステップを追加する場合、コアを変更する必要はありません。
//! 識別子とコンストラクタの組を [`StepRegistry::register`] で登録するだけです。
//!
//! ```rust
//! use stepline::step::{ExternalStep, Step, StepRegistry};
//!
//! let mut registry = StepRegistry::with_builtins();
//! registry.register("Approval", |config, _registry| {
//!     // 実際には承認ステップ独自の型を構築する
//!     Ok(Box::new(ExternalStep::from_config(config)?) as Box<dyn Step>)
//! });
//!
//! assert!(registry.contains("Approval"));
//! ```
//!
//! タイムライン種別のコンストラクタは子ステップの構築で同じレジストリを
//! 再帰的に利用するため、コンストラクタにはレジストリ自身が渡されます。

use std::collections::HashMap;

use tracing::debug;

use crate::config::StepConfig;
use crate::error::{Failable, StepError};
use crate::timeline::{self, Timeline};

use super::{external, ExternalStep, Step};

/// ステップのコンストラクタ
///
/// 設定とレジストリを受け取り、構築したステップまたは発生したエラーを返します。
pub type StepConstructor =
    Box<dyn Fn(&StepConfig, &StepRegistry) -> Failable<Box<dyn Step>> + Send + Sync>;

/// ステップ種別からコンストラクタを引くレジストリ
///
/// ステップ生成の唯一の入口です。登録されていない種別の設定を渡すと
/// [`StepError::UnknownStepType`] が返ります。
pub struct StepRegistry {
    constructors: HashMap<String, StepConstructor>,
}

impl StepRegistry {
    /// 何も登録されていないレジストリを生成
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// 組み込みのステップ種別を登録済みのレジストリを生成
    ///
    /// 登録される種別:
    ///
    /// - `"Timeline"` - [`Timeline`]
    /// - `"External"` - [`ExternalStep`]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register(timeline::STEP_TYPE, |config, registry| {
            Ok(Box::new(Timeline::from_config(config, registry)?) as Box<dyn Step>)
        });
        registry.register(external::STEP_TYPE, |config, _registry| {
            Ok(Box::new(ExternalStep::from_config(config)?) as Box<dyn Step>)
        });

        registry
    }

    /// ステップ種別とコンストラクタの組を登録
    ///
    /// 同じ種別を再登録した場合は後勝ちで上書きされます。
    ///
    /// # 引数
    ///
    /// - `step_type`: ステップ種別の識別子
    /// - `constructor`: 設定からステップを構築する関数
    pub fn register(
        &mut self,
        step_type: impl Into<String>,
        constructor: impl Fn(&StepConfig, &StepRegistry) -> Failable<Box<dyn Step>>
        + Send
        + Sync
        + 'static,
    ) {
        self.constructors
            .insert(step_type.into(), Box::new(constructor));
    }

    /// 指定した種別が登録されているか
    pub fn contains(&self, step_type: &str) -> bool {
        self.constructors.contains_key(step_type)
    }

    /// 登録済みのステップ種別の一覧
    pub fn step_types(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// 設定からステップを構築
    ///
    /// # 戻り値
    ///
    /// - `Ok(Box<dyn Step>)`: 構築に成功した場合
    /// - `Err(errors)`: 種別が未登録の場合は [`StepError::UnknownStepType`] が
    ///   1件だけ入ります。ネストしたタイムラインの構築失敗は、そのタイムラインが
    ///   生成した集約エラーがそのまま返り、層ごとに包み直されることはありません。
    pub fn create(&self, config: &StepConfig) -> Failable<Box<dyn Step>> {
        match self.constructors.get(&config.step_type) {
            Some(constructor) => {
                debug!(id = %config.id, step_type = %config.step_type, "ステップを構築");
                constructor(config, self)
            }
            None => Err(vec![StepError::UnknownStepType {
                id: config.id.clone(),
                step_type: config.step_type.clone(),
            }]),
        }
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StepContext;

    fn config(id: &str, step_type: &str) -> StepConfig {
        StepConfig {
            id: id.to_string(),
            label: id.to_string(),
            step_type: step_type.to_string(),
            active_step: None,
            context: StepContext::new(),
            steps: vec![],
        }
    }

    #[test]
    fn test_create_external_step() {
        let registry = StepRegistry::with_builtins();

        let step = registry
            .create(&config("a", "External"))
            .expect("構築に失敗");

        assert_eq!(step.id(), "a");
        assert_eq!(step.step_type(), "External");
    }

    #[test]
    fn test_create_unknown_type_returns_single_error() {
        let registry = StepRegistry::with_builtins();

        let errors = registry
            .create(&config("b", "Bogus"))
            .map(|_| ())
            .expect_err("未知の種別はエラーになるはず");

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            StepError::UnknownStepType { id, step_type }
                if id == "b" && step_type == "Bogus"
        ));
    }

    #[test]
    fn test_register_custom_step_type() {
        let mut registry = StepRegistry::with_builtins();
        assert!(!registry.contains("Approval"));

        registry.register("Approval", |config, _registry| {
            Ok(Box::new(ExternalStep::from_config(config)?) as Box<dyn Step>)
        });

        assert!(registry.contains("Approval"));

        let step = registry
            .create(&config("approve", "Approval"))
            .expect("構築に失敗");
        assert_eq!(step.id(), "approve");
    }

    #[test]
    fn test_builtin_types_registered() {
        let registry = StepRegistry::default();

        assert!(registry.contains("Timeline"));
        assert!(registry.contains("External"));
        assert_eq!(registry.step_types().count(), 2);
    }
}
