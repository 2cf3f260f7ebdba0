use crate::kernel::query::SearchSpec;

/// gate 状态变化后需要执行的 IO，由 app 层负责执行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEffect {
    StartSearch(SearchSpec),
    CancelSearch { search_id: u64 },
}
