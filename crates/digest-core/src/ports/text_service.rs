//! TextService port - AI Text Service（生成系 API）の抽象化
//!
//! coordinator はこの trait だけを通して provider を呼びます。
//! タイムアウトやリトライは実装側の責務です。

use async_trait::async_trait;

use crate::domain::{Article, OperationKind, ServiceError};

/// TextService は記事から要約・平易な書き直しを生成する
#[async_trait]
pub trait TextService: Send + Sync {
    async fn summarize(&self, article: &Article) -> Result<String, ServiceError>;

    async fn rewrite(&self, article: &Article) -> Result<String, ServiceError>;

    /// `kind` に応じて summarize / rewrite を呼び分ける
    async fn generate(
        &self,
        article: &Article,
        kind: OperationKind,
    ) -> Result<String, ServiceError> {
        match kind {
            OperationKind::Summary => self.summarize(article).await,
            OperationKind::Rewrite => self.rewrite(article).await,
        }
    }
}
