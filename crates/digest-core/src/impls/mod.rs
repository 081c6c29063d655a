//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **MockArticleSource**: 組み込み記事（開発用）
//! - **JsonFileArticleSource**: JSON ファイルからの記事読み込み
//! - **GeminiTextService**: Google Generative Language API
//! - **ScriptedTextService**: オフライン・テスト用の決定的な TextService

pub mod file_source;
pub mod gemini;
pub mod mock_source;
pub mod prompts;
pub mod scripted;

pub use self::file_source::JsonFileArticleSource;
pub use self::gemini::{GeminiConfig, GeminiTextService};
pub use self::mock_source::MockArticleSource;
pub use self::scripted::{ScriptedTextService, ServiceGate};
