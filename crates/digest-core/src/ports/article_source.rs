//! ArticleSource port - 記事一覧の供給元
//!
//! 実装は impls にあります（MockArticleSource, JsonFileArticleSource）。

use async_trait::async_trait;

use crate::domain::{Article, SourceError};

/// ArticleSource は順序付きで不変な記事列を返す
///
/// # 設計原則
/// - 返した記事は coordinator から見て read-only
/// - id は source 内で一意（重複は `SourceError::DuplicateId`）
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn list_articles(&self) -> Result<Vec<Article>, SourceError>;
}
