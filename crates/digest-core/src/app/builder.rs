//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 構成
//! - 設定から ArticleSource（mock / JSON ファイル）と Gemini の TextService を組み立てる
//! - offline 実行やテストでは source / service を個別に差し替える
//! - build() で必須の協調者の欠落と page_size 0 を検出する

use std::sync::Arc;

use tracing::info;

use super::config::DigestConfig;
use crate::cache::{
    Coordinator, DEFAULT_PAGE_SIZE, DEFAULT_PREVIEW_COUNT, GenerationHandle, SummaryBatch, Window,
};
use crate::domain::{Article, OperationKind, SourceError};
use crate::impls::{GeminiTextService, JsonFileArticleSource, MockArticleSource};
use crate::ports::{ArticleSource, Clock, IdGenerator, SystemClock, TextService, UlidGenerator};

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::from_config(&DigestConfig::from_env()?)?
///     .preview_count(5)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - ArticleSource と TextService は必須
/// - page_size 0 は build() 時に拒否
pub struct AppBuilder {
    article_source: Option<Arc<dyn ArticleSource>>,
    text_service: Option<Arc<dyn TextService>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    preview_count: usize,
    page_size: usize,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No article source configured.")]
    MissingArticleSource,
    #[error("No text service configured.")]
    MissingTextService,
    #[error("Page size must be at least 1.")]
    InvalidPageSize,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            article_source: None,
            text_service: None,
            clock: None,
            ids: None,
            preview_count: DEFAULT_PREVIEW_COUNT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// 設定から Gemini の TextService と ArticleSource を組み立てる
    pub fn from_config(config: &DigestConfig) -> Result<Self, BuildError> {
        let source: Arc<dyn ArticleSource> = match &config.source.articles_path {
            Some(path) => Arc::new(JsonFileArticleSource::new(path)),
            None => Arc::new(MockArticleSource::new().with_latency(config.source.latency)),
        };
        let service = GeminiTextService::new(config.service.clone())?;

        Ok(Self::new()
            .article_source(source)
            .text_service(Arc::new(service))
            .preview_count(config.preview_count)
            .page_size(config.page_size))
    }

    pub fn article_source(mut self, source: Arc<dyn ArticleSource>) -> Self {
        self.article_source = Some(source);
        self
    }

    pub fn text_service(mut self, service: Arc<dyn TextService>) -> Self {
        self.text_service = Some(service);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn preview_count(mut self, count: usize) -> Self {
        self.preview_count = count;
        self
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// AppBuilder を構築して App を生成
    ///
    /// # 検証
    /// - ArticleSource / TextService が未設定なら BuildError
    /// - page_size が 0 なら BuildError::InvalidPageSize
    pub fn build(self) -> Result<App, BuildError> {
        let source = self.article_source.ok_or(BuildError::MissingArticleSource)?;
        let service = self.text_service.ok_or(BuildError::MissingTextService)?;
        if self.page_size == 0 {
            return Err(BuildError::InvalidPageSize);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        Ok(App {
            source,
            coordinator: Coordinator::with_parts(service, clock, ids),
            preview_count: self.preview_count,
            page_size: self.page_size,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// App は記事一覧・要約・詳細ビューの裏側
///
/// 全ビューが 1 つの coordinator を共有し、preview で生成した要約は feed でも再利用されます。
pub struct App {
    source: Arc<dyn ArticleSource>,
    coordinator: Coordinator,
    preview_count: usize,
    page_size: usize,
}

impl App {
    pub async fn load_articles(&self) -> Result<Vec<Article>, SourceError> {
        let articles = self.source.list_articles().await?;
        info!(count = articles.len(), "articles loaded");
        Ok(articles)
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// 共有 coordinator 上の新しいビュー session
    pub fn summary_batch(&self) -> SummaryBatch {
        SummaryBatch::new(self.coordinator.clone())
    }

    pub fn preview_window(&self) -> Window {
        Window::FirstK(self.preview_count)
    }

    pub fn page_window(&self, index: usize) -> Window {
        Window::Page {
            index,
            size: self.page_size,
        }
    }

    pub fn page_count(&self, article_count: usize) -> usize {
        Window::total_pages(article_count, self.page_size)
    }

    /// 詳細ビュー: 1 記事の平易な書き直しを要求
    pub fn open_detail(&self, article: &Article) -> GenerationHandle {
        self.coordinator.request(article, OperationKind::Rewrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CacheEntry, CacheKey};
    use crate::impls::ScriptedTextService;
    use std::time::Duration;

    fn offline_builder() -> AppBuilder {
        AppBuilder::new()
            .article_source(Arc::new(MockArticleSource::new().with_latency(Duration::ZERO)))
            .text_service(Arc::new(ScriptedTextService::new()))
    }

    #[test]
    fn test_build_success() {
        let app = offline_builder().build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_article_source() {
        let app = AppBuilder::new()
            .text_service(Arc::new(ScriptedTextService::new()))
            .build();
        assert!(matches!(app, Err(BuildError::MissingArticleSource)));
    }

    #[test]
    fn test_build_missing_text_service() {
        let app = AppBuilder::new()
            .article_source(Arc::new(MockArticleSource::new()))
            .build();
        assert!(matches!(app, Err(BuildError::MissingTextService)));
    }

    #[test]
    fn test_build_rejects_zero_page_size() {
        let app = offline_builder().page_size(0).build();
        assert!(matches!(app, Err(BuildError::InvalidPageSize)));
    }

    #[test]
    fn test_windows_follow_configured_sizes() {
        let app = offline_builder().preview_count(2).page_size(3).build().unwrap();
        assert_eq!(app.preview_window(), Window::FirstK(2));
        assert_eq!(app.page_window(1), Window::Page { index: 1, size: 3 });
        assert_eq!(app.page_count(5), 2);
    }

    #[tokio::test]
    async fn test_from_config_accepts_overrides() {
        let config = DigestConfig::default();
        let app = AppBuilder::from_config(&config)
            .unwrap()
            .article_source(Arc::new(MockArticleSource::new().with_latency(Duration::ZERO)))
            .text_service(Arc::new(ScriptedTextService::new()))
            .build()
            .unwrap();

        let articles = app.load_articles().await.unwrap();
        assert_eq!(articles.len(), 5);
    }

    #[tokio::test]
    async fn test_unconfigured_config_fails_every_request() {
        let config = DigestConfig::default();
        let app = AppBuilder::from_config(&config)
            .unwrap()
            .article_source(Arc::new(MockArticleSource::new().with_latency(Duration::ZERO)))
            .build()
            .unwrap();
        let articles = app.load_articles().await.unwrap();

        let mut batch = app.summary_batch();
        let settled = batch.ensure(&articles, app.preview_window()).settle().await;
        assert_eq!(settled.len(), 3);
        assert!(settled.iter().all(|(_, result)| result.is_err()));
        assert!(matches!(
            app.coordinator().read(&CacheKey::summary("b1")),
            CacheEntry::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_detail_rewrite_leaves_summary_untouched() {
        let app = offline_builder().build().unwrap();
        let articles = app.load_articles().await.unwrap();

        let text = app.open_detail(&articles[3]).await.unwrap();
        assert!(text.starts_with("rewrite #1 of b4"));
        assert_eq!(
            app.coordinator().read(&CacheKey::summary("b4")),
            CacheEntry::Absent
        );
    }
}
