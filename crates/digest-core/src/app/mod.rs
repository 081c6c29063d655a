//! App - アプリケーション層
//!
//! ports と cache を組み合わせて、一覧・要約・詳細ビューの裏側を提供します。
//!
//! # 主要コンポーネント
//! - **DigestConfig**: 環境変数と `.env` からの設定
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **CacheStatus**: cache の状態ビュー

pub mod builder;
pub mod config;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::config::{ConfigError, DigestConfig, SourceConfig};
pub use self::status::{CacheCounts, CacheStatus, EntryStatus};
