//! Cache - 結果 cache と request coordinator
//!
//! - **Coordinator**: `(article, operation)` ごとの cache と in-flight 重複排除
//! - **GenerationHandle**: `request` が返す future
//! - **SummaryBatch**: 一覧画面向けのバッチ取得ポリシー

mod batch;
mod coordinator;
mod handle;
mod state;

pub use batch::{
    BatchTicket, DEFAULT_PAGE_SIZE, DEFAULT_PREVIEW_COUNT, SkipReason, SummaryBatch, Window,
};
pub use coordinator::Coordinator;
pub use handle::GenerationHandle;
