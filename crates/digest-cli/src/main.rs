use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use digest_core::app::{AppBuilder, DigestConfig};
use digest_core::domain::{Article, CacheEntry, CacheKey};
use digest_core::impls::ScriptedTextService;

const OFFLINE_LATENCY: Duration = Duration::from_millis(300);

#[derive(Parser, Debug)]
#[command(version, about = "Health news digest: summaries and plain-language rewrites", long_about = None)]
struct Args {
    /// Load articles from a JSON file instead of the built-in set
    #[arg(long)]
    articles: Option<PathBuf>,

    /// Use the scripted text service instead of Gemini
    #[arg(long)]
    offline: bool,

    /// Number of articles summarized in the preview
    #[arg(long)]
    preview: Option<usize>,

    /// Feed page to show (0-based)
    #[arg(long, default_value_t = 0)]
    page: usize,

    /// Articles per feed page
    #[arg(long)]
    page_size: Option<usize>,

    /// Open the detail view of an article and request its rewrite
    #[arg(long, value_name = "ID")]
    rewrite: Option<String>,

    /// Print the cache status as JSON at the end
    #[arg(long)]
    status: bool,
}

fn describe(entry: &CacheEntry) -> String {
    match entry {
        CacheEntry::Absent => "(not requested)".to_string(),
        CacheEntry::Pending => "(generating...)".to_string(),
        CacheEntry::Ready(text) => text.clone(),
        CacheEntry::Failed(error) => format!("[failed] {error}"),
    }
}

fn print_heading(article: &Article) {
    println!(
        "- [{}] {} ({}, {})",
        article.id, article.title, article.source, article.published_at
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    // (A) 設定: 環境変数 → CLI 引数で上書き
    let mut config = DigestConfig::from_env().context("failed to load configuration")?;
    if let Some(path) = args.articles {
        config.source.articles_path = Some(path);
    }
    if let Some(count) = args.preview {
        config.preview_count = count;
    }
    if let Some(size) = args.page_size {
        config.page_size = size;
    }

    let mut builder = AppBuilder::from_config(&config)?;
    if args.offline {
        info!("offline mode: using scripted text service");
        builder = builder.text_service(Arc::new(
            ScriptedTextService::new().with_latency(OFFLINE_LATENCY),
        ));
    }
    let app = builder.build()?;

    // (B) Step 1: 記事一覧の読み込み
    let articles = app
        .load_articles()
        .await
        .context("failed to load articles")?;
    println!("Step 1: {} articles", articles.len());
    for article in &articles {
        print_heading(article);
    }

    // (C) Step 2: 先頭 K 件の要約をまとめて取得
    let mut preview = app.summary_batch();
    let settled = preview.ensure(&articles, app.preview_window()).settle().await;
    println!("\nStep 2: summaries for the first {} articles", settled.len());
    for (key, result) in &settled {
        match result {
            Ok(text) => println!("- [{}]\n{text}\n", key.article_id),
            Err(error) => println!("- [{}] [failed] {error}", key.article_id),
        }
    }

    // (D) Step 3: feed のページ。preview で生成済みの要約は再利用される
    let pages = app.page_count(articles.len());
    if pages == 0 {
        println!("\nStep 3: feed is empty");
    } else if args.page >= pages {
        bail!("page {} out of range (feed has {pages} pages)", args.page);
    } else {
        let window = app.page_window(args.page);
        let mut feed = app.summary_batch();
        let ticket = feed.ensure(&articles, window);
        info!(issued = ticket.issued.len(), skipped = ticket.skipped.len(), "feed page requested");
        ticket.settle().await;

        println!("\nStep 3: feed page {} of {pages}", args.page + 1);
        for article in window.select(&articles) {
            print_heading(article);
            let entry = app.coordinator().read(&CacheKey::summary(article.id.clone()));
            println!("{}\n", describe(&entry));
        }
    }

    // (E) 詳細ビュー: rewrite を要求
    if let Some(id) = args.rewrite.as_deref() {
        let Some(article) = articles.iter().find(|a| a.id.as_str() == id) else {
            bail!("no article with id '{id}'");
        };
        println!("\nDetail: {}", article.title);
        println!("{}", article.url);
        match app.open_detail(article).await {
            Ok(text) => println!("\n{text}"),
            Err(error) => println!("\n[failed] {error}"),
        }
    }

    if args.status {
        let status = app.coordinator().status();
        println!("\n{}", serde_json::to_string_pretty(&status)?);
    }

    Ok(())
}
