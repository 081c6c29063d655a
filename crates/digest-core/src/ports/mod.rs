//! Ports - 抽象化レイヤー
//!
//! 外部の協調者（Article Source, AI Text Service）と、
//! テストで差し替えたい環境依存（時刻, ID 生成）への interface を定義します。

pub mod article_source;
pub mod clock;
pub mod id_generator;
pub mod text_service;

pub use self::article_source::ArticleSource;
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::text_service::TextService;
