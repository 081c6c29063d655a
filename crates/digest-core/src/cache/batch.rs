//! Batch - 一覧ビュー（先頭 K 件の preview と feed ページ）向けの要約取得
//!
//! ビューは表示中の記事の要約を求めます。`Absent` かつこの session で未試行の key だけを
//! request し、それ以外は skip するため、再描画で失敗が再試行されることはありません。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::coordinator::Coordinator;
use super::handle::GenerationHandle;
use crate::domain::{
    Article, ArticleId, CacheEntry, CacheKey, OperationKind, ServiceError, SessionId,
};

pub const DEFAULT_PREVIEW_COUNT: usize = 3;
pub const DEFAULT_PAGE_SIZE: usize = 4;

/// Window は記事一覧のうち表示中の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    FirstK(usize),
    Page { index: usize, size: usize },
}

impl Window {
    pub fn select<'a>(&self, articles: &'a [Article]) -> &'a [Article] {
        let (start, len) = match *self {
            Window::FirstK(k) => (0, k),
            Window::Page { index, size } => (index.saturating_mul(size), size),
        };
        let start = start.min(articles.len());
        let end = start.saturating_add(len).min(articles.len());
        &articles[start..end]
    }

    /// `article_count` 件を `size` 件ずつ並べたときのページ数
    pub fn total_pages(article_count: usize, size: usize) -> usize {
        if size == 0 {
            0
        } else {
            article_count.div_ceil(size)
        }
    }
}

/// SkipReason は window 内の記事を request しなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InFlight,
    Ready,
    Failed,
    AlreadyAttempted,
}

/// BatchTicket は window 1 回分で発行（または参加）した request
#[derive(Debug)]
pub struct BatchTicket {
    pub issued: Vec<GenerationHandle>,
    pub skipped: Vec<(ArticleId, SkipReason)>,
}

impl BatchTicket {
    pub fn issued_ids(&self) -> Vec<&ArticleId> {
        self.issued.iter().map(|h| &h.key().article_id).collect()
    }

    /// 発行した request を window の順に全て待つ
    pub async fn settle(self) -> Vec<(CacheKey, Result<String, ServiceError>)> {
        let mut settled = Vec::with_capacity(self.issued.len());
        for handle in self.issued {
            let key = handle.key().clone();
            settled.push((key, handle.await));
        }
        settled
    }
}

/// SummaryBatch は共有 coordinator 上の session 単位の要約バッチ
pub struct SummaryBatch {
    session: SessionId,
    coordinator: Coordinator,
    attempted: HashSet<CacheKey>,
}

impl SummaryBatch {
    pub fn new(coordinator: Coordinator) -> Self {
        Self {
            session: coordinator.new_session_id(),
            coordinator,
            attempted: HashSet::new(),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn was_attempted(&self, article_id: &ArticleId) -> bool {
        self.attempted.contains(&CacheKey::summary(article_id.clone()))
    }

    /// window 内で `Absent` かつ未試行の記事の要約を request
    pub fn ensure(&mut self, articles: &[Article], window: Window) -> BatchTicket {
        let mut ticket = BatchTicket {
            issued: Vec::new(),
            skipped: Vec::new(),
        };

        for article in window.select(articles) {
            let key = CacheKey::summary(article.id.clone());
            let skip = match self.coordinator.read(&key) {
                CacheEntry::Pending => Some(SkipReason::InFlight),
                CacheEntry::Ready(_) => Some(SkipReason::Ready),
                CacheEntry::Failed(_) => Some(SkipReason::Failed),
                CacheEntry::Absent if self.attempted.contains(&key) => {
                    Some(SkipReason::AlreadyAttempted)
                }
                CacheEntry::Absent => None,
            };

            match skip {
                Some(reason) => ticket.skipped.push((article.id.clone(), reason)),
                None => {
                    self.attempted.insert(key);
                    ticket
                        .issued
                        .push(self.coordinator.request(article, OperationKind::Summary));
                }
            }
        }

        info!(
            session = %self.session,
            ?window,
            issued = ticket.issued.len(),
            skipped = ticket.skipped.len(),
            "summary batch ensured"
        );
        ticket
    }

    /// 1 記事の明示的な再試行
    pub fn retry(&mut self, article: &Article) -> GenerationHandle {
        self.attempted.insert(CacheKey::summary(article.id.clone()));
        self.coordinator.regenerate(article, OperationKind::Summary)
    }

    /// window 内の要約を全て再生成（in-flight の key には参加）
    pub fn refresh(&mut self, articles: &[Article], window: Window) -> BatchTicket {
        let issued: Vec<GenerationHandle> = window
            .select(articles)
            .iter()
            .map(|article| self.retry(article))
            .collect();

        info!(session = %self.session, ?window, refreshed = issued.len(), "summary batch refreshed");
        BatchTicket {
            issued,
            skipped: Vec::new(),
        }
    }
}
