//! エラー型の定義
//!
//! このモジュールは、Stepline 全体で使用されるエラー型と、
//! 構築処理で使用するエラー集約の仕組みを定義します。

use thiserror::Error;

/// 設定関連のエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// ファイルの読み込み・書き込みに失敗
    #[error("設定ファイルの読み込みに失敗しました: {0}")]
    FileRead(#[from] std::io::Error),

    /// TOML のデシリアライズに失敗
    #[error("TOML のデシリアライズに失敗しました: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    /// TOML のシリアライズに失敗
    #[error("TOML のシリアライズに失敗しました: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON のシリアライズ・デシリアライズに失敗
    #[error("JSON の変換に失敗しました: {0}")]
    Json(#[from] serde_json::Error),
}

/// ステップ構築時のエラー
///
/// タイムラインの構築では、子ステップのエラーを途中で打ち切らずに
/// すべて収集してから [`StepError::TimelineInit`] として一括報告します。
#[derive(Debug, Error)]
pub enum StepError {
    /// ステップ種別がレジストリに登録されていない
    #[error("ステップ {id} (種別 {step_type}) を初期化できません: 未知のステップ種別です")]
    UnknownStepType {
        /// 対象ステップの ID
        id: String,
        /// 設定に記載されていたステップ種別
        step_type: String,
    },

    /// タイムラインの子ステップが空
    #[error("タイムライン {id} にはステップが1つ以上必要です")]
    EmptyTimeline {
        /// 対象タイムラインの ID
        id: String,
    },

    /// 指定された activeStep がどの子ステップにも一致しない
    #[error("タイムライン {id} の activeStep {active_step} はどの子ステップとも一致しません")]
    UnknownActiveStep {
        /// 対象タイムラインの ID
        id: String,
        /// 設定に記載されていた activeStep の ID
        active_step: String,
    },

    /// タイムライン初期化の集約エラー
    ///
    /// 子ステップで発生したエラーをすべて保持します。
    /// ネストしたタイムラインの失敗は、外側の集約の中では1件として扱われます。
    #[error("タイムライン {id} の初期化に失敗しました。以下のステップでエラーが発生しました:\n{}", render_step_errors(.errors))]
    TimelineInit {
        /// 対象タイムラインの ID
        id: String,
        /// 子ステップで発生したエラーの一覧（1件以上）
        errors: Vec<StepError>,
    },
}

impl StepError {
    /// エラーの対象となったステップの ID
    pub fn step_id(&self) -> &str {
        match self {
            StepError::UnknownStepType { id, .. } => id,
            StepError::EmptyTimeline { id } => id,
            StepError::UnknownActiveStep { id, .. } => id,
            StepError::TimelineInit { id, .. } => id,
        }
    }
}

/// 集約エラーの本文を1ステップ1行で整形する
fn render_step_errors(errors: &[StepError]) -> String {
    errors
        .iter()
        .map(|err| match err {
            StepError::UnknownStepType { id, step_type } => {
                format!("  {id} ({step_type}):\t{err}")
            }
            other => format!("  {}:\t{other}", other.step_id()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 構築処理の結果型
///
/// 成功時は値を、失敗時は発生したエラーを**すべて**保持します。
/// 失敗時のエラーリストが空になることはありません。
pub type Failable<T, E = StepError> = Result<T, Vec<E>>;

/// エラーを集約するビルダー
///
/// 子要素ごとの失敗を途中で打ち切らずに蓄積し、最後に
/// [`ErrorCollector::finish`] で成功・失敗のどちらかに確定させます。
#[derive(Debug)]
pub struct ErrorCollector<E = StepError> {
    errors: Vec<E>,
}

impl<E> ErrorCollector<E> {
    /// 空のコレクターを生成
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// エラーを1件追加
    pub fn push(&mut self, error: E) {
        self.errors.push(error);
    }

    /// エラーをまとめて追加
    pub fn extend(&mut self, errors: impl IntoIterator<Item = E>) {
        self.errors.extend(errors);
    }

    /// エラーが1件も記録されていないか
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 記録されたエラー件数
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// 集約を確定させる
    ///
    /// # 戻り値
    ///
    /// - `Ok(value)`: エラーが1件も記録されていない場合
    /// - `Err(errors)`: 1件以上のエラーが記録されている場合
    pub fn finish<T>(self, value: T) -> Failable<T, E> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }

    /// 記録済みのエラーを取り出す
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }
}

impl<E> Default for ErrorCollector<E> {
    fn default() -> Self {
        Self::new()
    }
}
