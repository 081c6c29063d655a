//! Errors - エラー型と分類
//!
//! - `ServiceError`: AI Text Service の失敗。cache に `Failed` として保存され、
//!   同じ generation の全 waiter に配られるため `Clone` を実装します。
//! - `SourceError`: Article Source の失敗。

use serde::{Deserialize, Serialize};

use super::ids::ArticleId;

/// ServiceErrorKind は AI Text Service の失敗分類
///
/// どの分類も coordinator は同じ扱い（`Failed` に保存、自動リトライなし）。
/// - Unconfigured: 認証情報がない（再設定まで恒久的）
/// - NetworkFailure: 接続・タイムアウト（一時的）
/// - ProviderError: provider がエラーまたは不正な結果を返した
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorKind {
    Unconfigured,
    NetworkFailure,
    ProviderError,
}

impl std::fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceErrorKind::Unconfigured => "unconfigured",
            ServiceErrorKind::NetworkFailure => "network failure",
            ServiceErrorKind::ProviderError => "provider error",
        };
        f.write_str(name)
    }
}

/// ServiceError は AI Text Service の失敗
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    kind: ServiceErrorKind,
    message: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unconfigured(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Unconfigured, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::NetworkFailure, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::ProviderError, message)
    }

    pub fn kind(&self) -> ServiceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// SourceError は Article Source の失敗
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read articles: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode articles: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("duplicate article id '{0}'")]
    DuplicateId(ArticleId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_and_message() {
        let err = ServiceError::network("connection reset");
        assert_eq!(err.to_string(), "network failure: connection reset");
        assert_eq!(err.kind(), ServiceErrorKind::NetworkFailure);
        assert_eq!(err.message(), "connection reset");
    }

    #[test]
    fn clones_compare_equal() {
        let err = ServiceError::unconfigured("no key");
        assert_eq!(err.clone(), err);
    }
}
