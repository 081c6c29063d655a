//! Status - cache の状態ビュー
//!
//! # 使用例
//! ```ignore
//! let status = coordinator.status();
//! println!("{}", serde_json::to_string_pretty(&status)?);
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{CacheKey, EntryState, GenerationId, ServiceErrorKind};

/// Number of entries per state. `stale` counts settled entries awaiting regeneration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCounts {
    pub pending: usize,
    pub ready: usize,
    pub failed: usize,
    pub stale: usize,
}

/// One cache key as seen by the status view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryStatus {
    pub key: CacheKey,
    pub state: EntryState,
    pub generation: GenerationId,
    pub settled_at_ms: Option<i64>,
    pub stale: bool,
    pub error: Option<ServiceErrorKind>,
}

/// Snapshot of the whole cache, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub counts: CacheCounts,
    pub entries: Vec<EntryStatus>,
}

impl CacheStatus {
    pub fn is_idle(&self) -> bool {
        self.counts.pending == 0
    }
}
