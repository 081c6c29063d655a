//! Operation - 操作の種類と cache key

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::ArticleId;

/// OperationKind は記事に対して要求する変換
///
/// 同じ記事でも Summary と Rewrite の結果は別の cache 名前空間に入ります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Summary,
    Rewrite,
}

impl OperationKind {
    pub const ALL: [OperationKind; 2] = [OperationKind::Summary, OperationKind::Rewrite];

    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::Summary => "summary",
            OperationKind::Rewrite => "rewrite",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CacheKey は 1 つの cache 結果 `(article, operation)` を識別
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub article_id: ArticleId,
    pub kind: OperationKind,
}

impl CacheKey {
    pub fn new(article_id: impl Into<ArticleId>, kind: OperationKind) -> Self {
        Self {
            article_id: article_id.into(),
            kind,
        }
    }

    pub fn summary(article_id: impl Into<ArticleId>) -> Self {
        Self::new(article_id, OperationKind::Summary)
    }

    pub fn rewrite(article_id: impl Into<ArticleId>) -> Self {
        Self::new(article_id, OperationKind::Rewrite)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.article_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_differ_by_kind() {
        assert_ne!(CacheKey::summary("b4"), CacheKey::rewrite("b4"));
        assert_eq!(CacheKey::summary("b4"), CacheKey::new("b4", OperationKind::Summary));
    }

    #[test]
    fn key_display_names_kind_then_article() {
        assert_eq!(CacheKey::rewrite("b2").to_string(), "rewrite/b2");
    }
}
