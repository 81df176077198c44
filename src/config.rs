//! ステップ設定の読み込みと管理を行うモジュール
//!
//! # 責務
//!
//! このモジュールは、ステップツリーを宣言的に定義するための設定型を提供します。
//! 設定はキーが camelCase の TOML / JSON として読み書きでき、
//! [`StepRegistry`](crate::step::registry::StepRegistry) を通じて
//! 実際のステップインスタンスへ変換されます。
//!
//! ## 主な機能
//!
//! - **宣言的定義**: ステップの連なりを入れ子の設定ツリーとして記述
//! - **ファイル入出力**: TOML ファイルからの読み込みと保存
//! - **シリアライズ**: UI や永続化層との受け渡しに使える JSON 変換
//!
//! ## 使用例
//!
//! ```toml
//! id = "onboarding"
//! label = "オンボーディング"
//! stepType = "Timeline"
//!
//! [[steps]]
//! duration = 1.0
//!
//! [steps.step]
//! id = "welcome"
//! label = "ようこそ"
//! stepType = "External"
//! ```
//!
//! ## 関連モジュール
//!
//! - [`crate::step::registry`]: 設定からステップを構築するファクトリー
//! - [`crate::timeline`]: タイムラインの構築と操作

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// ステップのコンテキスト
///
/// 任意のキーと値を持つマッピングです。繰り返し現れる同一ステップを
/// 区別する用途など、具象バリアント側の判断材料として使われます。
pub type StepContext = serde_json::Map<String, serde_json::Value>;

/// ステップ設定
///
/// ステップツリーの1ノードを表します。`step_type` がタイムラインを指す場合のみ
/// `steps` と `active_step` が意味を持ちます。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepConfig {
    /// ステップの ID。兄弟の中で一意で、再構築をまたいで安定していること
    pub id: String,

    /// 表示名。一意である必要はない
    pub label: String,

    /// ステップ種別。レジストリのディスパッチに使われる
    pub step_type: String,

    /// 構築直後にアクティブにする子ステップの ID（タイムラインのみ、省略可）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_step: Option<String>,

    /// 任意のコンテキスト
    #[serde(default)]
    pub context: StepContext,

    /// 子ステップの設定（タイムラインのみ）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<TimelineEntryConfig>,
}

/// タイムラインの子ステップ設定
///
/// 子ステップの設定と、そのステップに割り当てる duration の組です。
/// duration はコアでは解釈されない不透明なデータです。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntryConfig {
    /// ステップに割り当てる duration（単位はコアでは規定しない）
    pub duration: f64,

    /// 子ステップの設定
    pub step: StepConfig,
}

impl StepConfig {
    /// TOML ファイルからステップ設定を読み込む
    ///
    /// # 引数
    ///
    /// * `path` - TOML ファイルのパス
    ///
    /// # 戻り値
    ///
    /// * `Ok(StepConfig)` - 読み込みに成功した場合
    /// * `Err(ConfigError)` - ファイルの読み込みまたはパースに失敗した場合
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// TOML 文字列からステップ設定を読み込む
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// JSON 文字列からステップ設定を読み込む
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// ステップ設定を TOML 文字列に変換
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// ステップ設定を JSON 文字列に変換
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// ステップ設定を TOML ファイルに保存
    ///
    /// # 引数
    ///
    /// * `path` - 保存先のファイルパス
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let raw = self.to_toml()?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_camel_case_keys() {
        let raw = r#"{
            "id": "root",
            "label": "Root",
            "stepType": "Timeline",
            "steps": [
                { "duration": 1, "step": { "id": "a", "label": "A", "stepType": "External", "context": {} } },
                { "duration": 2.5, "step": { "id": "b", "label": "B", "stepType": "External", "context": {} } }
            ]
        }"#;

        let config = StepConfig::from_json(raw).expect("JSON のパースに失敗");

        assert_eq!(config.id, "root");
        assert_eq!(config.step_type, "Timeline");
        assert_eq!(config.steps.len(), 2);
        assert_eq!(config.steps[0].duration, 1.0);
        assert_eq!(config.steps[1].duration, 2.5);
        assert_eq!(config.steps[1].step.id, "b");
        assert!(config.active_step.is_none());
    }

    #[test]
    fn test_from_toml_nested_steps() {
        let raw = r#"
            id = "root"
            label = "Root"
            stepType = "Timeline"
            activeStep = "b"

            [[steps]]
            duration = 1.0

            [steps.step]
            id = "a"
            label = "A"
            stepType = "External"

            [steps.step.context]
            round = 1

            [[steps]]
            duration = 2.0

            [steps.step]
            id = "b"
            label = "B"
            stepType = "External"
        "#;

        let config = StepConfig::from_toml(raw).expect("TOML のパースに失敗");

        assert_eq!(config.active_step.as_deref(), Some("b"));
        assert_eq!(config.steps.len(), 2);
        assert_eq!(config.steps[0].step.context.get("round"), Some(&serde_json::json!(1)));
        // context 省略時は空のマップ
        assert!(config.steps[1].step.context.is_empty());
    }

    #[test]
    fn test_toml_roundtrip() {
        let raw = r#"
            id = "root"
            label = "Root"
            stepType = "Timeline"

            [[steps]]
            duration = 3.0

            [steps.step]
            id = "only"
            label = "Only"
            stepType = "External"
        "#;

        let original = StepConfig::from_toml(raw).expect("TOML のパースに失敗");
        let serialized = original.to_toml().expect("TOML への変換に失敗");
        let restored = StepConfig::from_toml(&serialized).expect("再パースに失敗");

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.steps.len(), original.steps.len());
        assert_eq!(restored.steps[0].step.id, "only");
    }
}
