//! Domain identifiers (strongly-typed IDs).
//!
//! # ID の種類
//! - **ArticleId**: Article Source が与える文字列 ID（例: `b1`）。安定・一意。
//! - **GenerationId**: AI Text Service への 1 回の呼び出し（generation）を識別する ULID。
//! - **SessionId**: バッチ取得の「この session で試行済み」集合を識別する ULID。
//!
//! ## Phantom Type パターン
//! `Id<T>` で ULID ベースの共通実装を提供しつつ、`T` はマーカー型として
//! GenerationId と SessionId を型レベルで区別します。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Identifier of an article, as given by the article source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArticleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// IdMarker は各 ULID ID 型のマーカー trait
///
/// Display で使うプレフィックス（"gen-", "session-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ULID ID 型
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Generation のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Generation {}

impl IdMarker for Generation {
    fn prefix() -> &'static str {
        "gen-"
    }
}

/// Session のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Session {}

impl IdMarker for Session {
    fn prefix() -> &'static str {
        "session-"
    }
}

/// Identifier of one underlying AI Text Service call.
pub type GenerationId = Id<Generation>;

/// Identifier of a batch-orchestration session.
pub type SessionId = Id<Session>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_id_displays_raw_value() {
        let id = ArticleId::new("b1");
        assert_eq!(id.to_string(), "b1");
        assert_eq!(id.as_str(), "b1");
        assert_eq!(ArticleId::from("b1"), id);
    }

    #[test]
    fn article_id_serializes_as_plain_string() {
        let id = ArticleId::new("b3");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"b3\"");
        let back: ArticleId = serde_json::from_str("\"b3\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ulid_ids_carry_prefixes() {
        let generation = GenerationId::from_ulid(Ulid::new());
        let session = SessionId::from_ulid(Ulid::new());

        assert!(generation.to_string().starts_with("gen-"));
        assert!(session.to_string().starts_with("session-"));

        // let _: GenerationId = session; // <- does not compile
    }

    #[test]
    fn generation_ids_sort_by_creation_time() {
        let first = GenerationId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = GenerationId::from_ulid(Ulid::new());
        assert!(first < second);
    }
}
