//! Article - Article Source が供給する記事レコード

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::errors::SourceError;
use super::ids::ArticleId;

/// Article は不変の健康ニュース記事
///
/// coordinator が読むのは `id` だけで、レコード全体は text service に渡されます。
/// フィールド名は feed の camelCase（`publishedAt`）に従います。
/// `published_at` は表示専用で、feed の値をそのまま保持します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub source: String,
    pub published_at: String,
    pub content: String,
    pub url: String,
}

impl Article {
    pub fn id(&self) -> &ArticleId {
        &self.id
    }
}

/// 最初に重複した id で `SourceError::DuplicateId` を返す
pub fn ensure_unique_ids(articles: &[Article]) -> Result<(), SourceError> {
    let mut seen = HashSet::with_capacity(articles.len());
    for article in articles {
        if !seen.insert(&article.id) {
            return Err(SourceError::DuplicateId(article.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_article(id: &str) -> Article {
    Article {
        id: ArticleId::new(id),
        title: format!("Article {id}"),
        source: "Test Wire".to_string(),
        published_at: "2025-12-01".to_string(),
        content: format!("Body of article {id}."),
        url: format!("https://news.example/article/{id}"),
    }
}
