//! MockArticleSource - 組み込みの健康ニュース 5 件を返す Article Source
//!
//! 実際の fetch を模して、一定の latency の後に記事を返します。

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Article, ArticleId, SourceError, ensure_unique_ids};
use crate::ports::ArticleSource;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

pub struct MockArticleSource {
    articles: Vec<Article>,
    latency: Duration,
}

impl MockArticleSource {
    /// The built-in article set with the default latency.
    pub fn new() -> Self {
        Self::with_articles(builtin_articles())
    }

    pub fn with_articles(articles: Vec<Article>) -> Self {
        Self {
            articles,
            latency: DEFAULT_LATENCY,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl Default for MockArticleSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleSource for MockArticleSource {
    async fn list_articles(&self) -> Result<Vec<Article>, SourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        ensure_unique_ids(&self.articles)?;
        debug!(count = self.articles.len(), "mock articles listed");
        Ok(self.articles.clone())
    }
}

fn article(id: &str, title: &str, source: &str, published_at: &str, content: &str, url: &str) -> Article {
    Article {
        id: ArticleId::new(id),
        title: title.to_string(),
        source: source.to_string(),
        published_at: published_at.to_string(),
        content: content.to_string(),
        url: url.to_string(),
    }
}

pub fn builtin_articles() -> Vec<Article> {
    vec![
        article(
            "b1",
            "New nasal vaccine shows strong protection against COVID variants",
            "Global Health News",
            "2025-12-05",
            "Scientists have developed a new intranasal vaccine designed to block COVID-19 infection from the nose and throat, the primary entry points for the virus. Early trials show that it generates a strong mucosal immune response and offers broad protection against Omicron-derived variants. Unlike injections, nasal vaccines may reduce transmission more effectively. The vaccine is currently being tested in India, Japan, and Brazil. Researchers hope it will improve vaccination rates among individuals afraid of needles.",
            "https://ghnews.example/article/b1",
        ),
        article(
            "b2",
            "Wearable patch monitors hydration in athletes in real-time",
            "Sports Health Daily",
            "2025-12-04",
            "Engineers have created a flexible skin patch that analyzes sweat biomarkers, helping athletes avoid dehydration. The device connects to smartphones and alerts users when electrolyte levels drop too low. Field tests with marathon runners showed a 90% accuracy in predicting dehydration before symptoms began. The invention could reduce heat-related injuries during long-duration sports. Manufacturers aim to release consumer models next year.",
            "https://sportshealth.example/article/b2",
        ),
        article(
            "b3",
            "Plant-based omega-3 supplement benefits heart and joint health",
            "Wellness Journal",
            "2025-12-03",
            "A new algae-derived omega-3 supplement shows equal or better absorption than fish oil, according to a clinical trial with 1,500 participants. Users reported reduced joint stiffness and improved cholesterol levels after 12 weeks. Unlike fish oil, plant-based omega-3 avoids ocean contamination concerns and is more sustainable. Doctors expect rising popularity among vegans and people with seafood allergies.",
            "https://wellnessjournal.example/article/b3",
        ),
        article(
            "b4",
            "Mental health chatbot reduces anxiety in college students",
            "Psychology Today Reports",
            "2025-12-02",
            "A digital mental health program utilizing AI chatbots helped reduce anxiety symptoms by 35% among university students. The chatbot teaches breathing exercises, sleep hygiene, and cognitive behavior strategies. Researchers noted that students used the chatbot more frequently than access to traditional counseling due to convenience and privacy. Experts say it should complement, not replace, licensed therapists.",
            "https://psychtoday.example/article/b4",
        ),
        article(
            "b5",
            "High-fiber diets linked to reduced colon cancer risk",
            "Medical Research Digest",
            "2025-12-01",
            "A meta-analysis involving over 50,000 adults concluded that people who consumed at least 30 grams of dietary fiber daily had a 25% lower risk of developing colon cancer. Fruits, legumes, and whole grains were highlighted as the most protective sources. Researchers believe fiber improves gut bacteria and reduces inflammation in the digestive tract. Public health authorities encourage adding more plant-based foods into daily meals.",
            "https://meddigest.example/article/b5",
        ),
    ]
}
