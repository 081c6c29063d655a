//! CacheEntry - cache entry の状態機械

use serde::{Deserialize, Serialize};

use super::errors::ServiceError;

/// CacheEntry は 1 つの `(article, operation)` の結果の状態
///
/// 状態遷移:
/// - Absent -> Pending -> Ready
/// - Absent -> Pending -> Failed
/// - Ready / Failed -> (invalidate, request) -> Pending -> Ready / Failed
///
/// 再生成中（Pending）は以前の値を返さない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    /// 未要求
    Absent,

    /// service 呼び出しが in-flight
    Pending,

    /// service が生成したテキスト
    Ready(String),

    /// service が失敗。明示的な再試行まで終端
    Failed(ServiceError),
}

impl CacheEntry {
    pub fn state(&self) -> EntryState {
        match self {
            CacheEntry::Absent => EntryState::Absent,
            CacheEntry::Pending => EntryState::Pending,
            CacheEntry::Ready(_) => EntryState::Ready,
            CacheEntry::Failed(_) => EntryState::Failed,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, CacheEntry::Absent)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CacheEntry::Pending)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            CacheEntry::Ready(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            CacheEntry::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// EntryState は payload を除いた CacheEntry の serialize 可能なビュー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Absent,
    Pending,
    Ready,
    Failed,
}

impl From<&CacheEntry> for EntryState {
    fn from(entry: &CacheEntry) -> Self {
        entry.state()
    }
}
