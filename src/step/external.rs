//! 外部ステップ
//!
//! # 責務
//!
//! - 基底のライフサイクル以外の振る舞いを持たない最小の具象ステップを提供
//! - バリアントディスパッチの契約を満たすプレースホルダー
//!
//! 実際のデプロイでは、このバリアントを置き換えるか拡張してドメイン固有の
//! リーフステップを実装します。ファクトリーとタイムラインは他の種別と
//! まったく同じように扱います。

use async_trait::async_trait;

use crate::config::StepConfig;
use crate::error::Failable;

use super::{Step, StepMeta};

/// 外部ステップのステップ種別識別子
pub const STEP_TYPE: &str = "External";

/// 外部ステップ
///
/// 基底のライフサイクルをそのまま使う素通しのリーフステップです。
#[derive(Debug)]
pub struct ExternalStep {
    meta: StepMeta,
}

impl ExternalStep {
    /// 設定から外部ステップを生成
    ///
    /// 外部ステップの構築は失敗しませんが、他のバリアントと同じ
    /// [`Failable`] を返してファクトリーの契約に揃えています。
    pub fn from_config(config: &StepConfig) -> Failable<Self> {
        Ok(Self {
            meta: StepMeta::from_config(config),
        })
    }
}

#[async_trait]
impl Step for ExternalStep {
    fn meta(&self) -> &StepMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut StepMeta {
        &mut self.meta
    }

    fn step_type(&self) -> &str {
        STEP_TYPE
    }
}
