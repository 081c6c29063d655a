//! digest-core
//!
//! Summary and rewrite cache for a health-news digest.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, article, operation, entry, errors）
//! - **ports**: 抽象化レイヤー（ArticleSource, TextService, Clock, IdGenerator）
//! - **cache**: Coordinator（cache + in-flight 重複排除）と一覧向けの SummaryBatch
//! - **impls**: 実装（Gemini, mock / JSON article source, scripted service）
//! - **app**: 設定, builder, status view

pub mod app;
pub mod cache;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{App, AppBuilder, DigestConfig};
pub use cache::{Coordinator, GenerationHandle, SummaryBatch, Window};
