//! 搜索会话的排队与替换（gate）
//!
//! 纯状态机，不做 IO：输入是查询、时钟和进程消息，输出是 `SearchEffect`。
//! 同一时刻只有一个会话的结果会被发布；被替换的会话，哪怕已经流出了部分结果，也整体丢弃。

use crate::kernel::effect::SearchEffect;
use crate::kernel::query::{normalize, SearchSpec};
use crate::kernel::services::ports::{
    MatchRecord, SearchEnd, SearchError, SearchFailure, SearchMessage,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Searching(u64),
    /// 会话已被取消，等待它的进程退出；它的任何消息都会被丢弃
    Superseded(u64),
}

#[derive(Debug, Clone)]
struct PendingQuery {
    spec: SearchSpec,
    deadline: Instant,
}

#[derive(Debug)]
pub struct SearchState {
    query: String,
    gate: GateState,
    pending: Option<PendingQuery>,
    results: Vec<MatchRecord>,
    max_results: usize,
    end: Option<SearchEnd>,
    last_error: Option<SearchFailure>,
}

impl SearchState {
    pub fn new(max_results: usize) -> Self {
        Self {
            query: String::new(),
            gate: GateState::Idle,
            pending: None,
            results: Vec::new(),
            max_results,
            end: None,
            last_error: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn gate(&self) -> GateState {
        self.gate
    }

    pub fn results(&self) -> &[MatchRecord] {
        &self.results
    }

    pub fn last_error(&self) -> Option<&SearchFailure> {
        self.last_error.as_ref()
    }

    /// 最近一次会话是否因为达到上限而提前结束
    pub fn is_capped(&self) -> bool {
        self.end == Some(SearchEnd::Capped)
    }

    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// 没有活跃会话，也没有等待中的查询
    pub fn is_settled(&self) -> bool {
        self.gate == GateState::Idle && self.pending.is_none()
    }

    /// 新查询。空闲时立即启动；有会话在跑时等输入停顿 `debounce` 之后再替换。
    pub fn submit_query(
        &mut self,
        raw_text: &str,
        now: Instant,
        debounce: Duration,
    ) -> Vec<SearchEffect> {
        self.query = raw_text.to_string();
        let spec = normalize(raw_text);

        if spec.is_empty() {
            self.pending = None;
            self.reset_results();
            return match self.gate {
                GateState::Searching(search_id) => {
                    self.gate = GateState::Superseded(search_id);
                    vec![SearchEffect::CancelSearch { search_id }]
                }
                GateState::Idle | GateState::Superseded(_) => Vec::new(),
            };
        }

        match self.gate {
            GateState::Searching(_) if !debounce.is_zero() => {
                self.pending = Some(PendingQuery {
                    spec,
                    deadline: now + debounce,
                });
                Vec::new()
            }
            _ => self.supersede_with(spec),
        }
    }

    /// 到点的待处理查询替换当前会话
    pub fn tick(&mut self, now: Instant) -> Vec<SearchEffect> {
        match self.pending.as_ref() {
            Some(pending) if pending.deadline <= now => {}
            _ => return Vec::new(),
        }
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        self.supersede_with(pending.spec)
    }

    fn supersede_with(&mut self, spec: SearchSpec) -> Vec<SearchEffect> {
        self.pending = None;
        let mut effects = Vec::with_capacity(2);
        if let GateState::Searching(search_id) = self.gate {
            self.gate = GateState::Superseded(search_id);
            effects.push(SearchEffect::CancelSearch { search_id });
        }
        self.reset_results();
        effects.push(SearchEffect::StartSearch(spec));
        effects
    }

    fn reset_results(&mut self) {
        self.results.clear();
        self.end = None;
        self.last_error = None;
    }

    pub fn search_started(&mut self, search_id: u64) {
        self.gate = GateState::Searching(search_id);
    }

    /// 启动失败：回到 Idle，结果保持为空，错误留给调用方展示
    pub fn search_failed_to_start(&mut self, error: &SearchError) {
        self.gate = GateState::Idle;
        self.results.clear();
        self.last_error = Some(error.into());
    }

    /// 显式取消：已经收到的结果保留为当前结果
    pub fn cancel(&mut self) -> Vec<SearchEffect> {
        self.pending = None;
        match self.gate {
            GateState::Searching(search_id) => {
                self.gate = GateState::Idle;
                vec![SearchEffect::CancelSearch { search_id }]
            }
            GateState::Superseded(_) => {
                self.gate = GateState::Idle;
                Vec::new()
            }
            GateState::Idle => Vec::new(),
        }
    }

    pub fn apply_message(&mut self, msg: SearchMessage) -> bool {
        let search_id = msg.search_id();

        if self.gate == GateState::Superseded(search_id) {
            // 被替换的会话结束后 gate 才真正空闲
            if !matches!(msg, SearchMessage::Record { .. }) {
                self.gate = GateState::Idle;
                return true;
            }
            return false;
        }

        if self.gate != GateState::Searching(search_id) {
            tracing::trace!(search_id, "dropping stale search message");
            return false;
        }

        match msg {
            SearchMessage::Record { record, .. } => {
                if self.results.len() >= self.max_results {
                    return false;
                }
                self.results.push(record);
                true
            }
            SearchMessage::Complete { total, end, .. } => {
                tracing::debug!(search_id, total, end = ?end, "search complete");
                self.gate = GateState::Idle;
                self.end = Some(end);
                true
            }
            SearchMessage::Cancelled { .. } => {
                self.gate = GateState::Idle;
                true
            }
            SearchMessage::Error { error, .. } => {
                tracing::warn!(search_id, error = %error, "search failed");
                self.gate = GateState::Idle;
                self.results.clear();
                self.last_error = Some((&error).into());
                true
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/search.rs"]
mod tests;
