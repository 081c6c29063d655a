//! JsonFileArticleSource - JSON 配列ファイルから記事を読む Article Source

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Article, SourceError, ensure_unique_ids};
use crate::ports::ArticleSource;

pub struct JsonFileArticleSource {
    path: PathBuf,
}

impl JsonFileArticleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ArticleSource for JsonFileArticleSource {
    async fn list_articles(&self) -> Result<Vec<Article>, SourceError> {
        let bytes = tokio::fs::read(&self.path).await?;
        let articles: Vec<Article> = serde_json::from_slice(&bytes)?;
        ensure_unique_ids(&articles)?;
        debug!(path = %self.path.display(), count = articles.len(), "articles loaded from file");
        Ok(articles)
    }
}
