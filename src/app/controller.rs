//! 搜索控制器
//!
//! 持有 gate 状态和 rg 服务，执行 gate 产生的 effect。
//! 所有状态变更都发生在调用方线程上；进程 IO 在 tokio runtime 里，结果经 channel 回来。

use crate::kernel::services::adapters::search::{
    probe_read_strategy, ReadStrategy, RipgrepService, SearchCommand, SearchTask,
};
use crate::kernel::services::ports::search::Result as SearchResult;
use crate::kernel::services::ports::{
    MatchRecord, SearchFailure, SearchMessage, SearchSettings,
};
use crate::kernel::{GateState, SearchEffect, SearchState};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

pub struct SearchController {
    service: RipgrepService,
    settings: SearchSettings,
    root: PathBuf,
    state: SearchState,
    live: Option<SearchTask>,
    tx: Sender<SearchMessage>,
    rx: Receiver<SearchMessage>,
}

impl SearchController {
    /// `read_mode` 为 auto 时在这里探测一次读取策略。
    /// 会阻塞当前线程，不能在 runtime 的异步上下文里调用。
    pub fn new(runtime: tokio::runtime::Handle, root: PathBuf, settings: SearchSettings) -> Self {
        let strategy = ReadStrategy::from_mode(settings.read_mode)
            .unwrap_or_else(|| runtime.block_on(probe_read_strategy(&settings.rg_path)));
        Self::with_strategy(runtime, root, settings, strategy)
    }

    pub fn with_strategy(
        runtime: tokio::runtime::Handle,
        root: PathBuf,
        settings: SearchSettings,
        strategy: ReadStrategy,
    ) -> Self {
        let command = SearchCommand::new(settings.rg_path.clone(), root.clone(), settings.include_hidden);
        let (tx, rx) = mpsc::channel();
        tracing::info!(
            root = %root.display(),
            max_results = settings.max_results,
            debounce_ms = settings.debounce_ms,
            strategy = ?strategy,
            "search controller ready"
        );
        Self {
            service: RipgrepService::new(runtime, command, strategy),
            state: SearchState::new(settings.max_results),
            settings,
            root,
            live: None,
            tx,
            rx,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn gate(&self) -> GateState {
        self.state.gate()
    }

    pub fn results(&self) -> &[MatchRecord] {
        self.state.results()
    }

    pub fn last_error(&self) -> Option<&SearchFailure> {
        self.state.last_error()
    }

    pub fn set_query(&mut self, raw_text: &str) -> SearchResult<()> {
        self.set_query_at(raw_text, Instant::now())
    }

    /// 查询变更；启动失败时返回 `SearchError::Spawn`，gate 回到 Idle。
    pub fn set_query_at(&mut self, raw_text: &str, now: Instant) -> SearchResult<()> {
        self.pump();
        let effects = self
            .state
            .submit_query(raw_text, now, self.settings.debounce());
        self.run_effects(effects)
    }

    pub fn tick(&mut self) -> SearchResult<()> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> SearchResult<()> {
        let effects = self.state.tick(now);
        self.run_effects(effects)
    }

    pub fn cancel(&mut self) {
        let effects = self.state.cancel();
        // 取消不会失败
        let _ = self.run_effects(effects);
        self.pump();
    }

    /// 取出所有已到达的消息。返回结果列表或状态是否变化。
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            changed |= self.apply(msg);
        }
        changed
    }

    /// 一直处理消息和 debounce，直到 gate 空闲或超时。返回是否已空闲。
    pub fn wait_settled(&mut self, timeout: Duration) -> SearchResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            self.tick()?;
            if self.state.is_settled() {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }

            let mut wait = deadline - now;
            if let Some(pending) = self.state.pending_deadline() {
                wait = wait.min(pending.saturating_duration_since(now));
            }

            match self.rx.recv_timeout(wait) {
                Ok(msg) => {
                    self.apply(msg);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(self.state.is_settled()),
            }
        }
    }

    fn apply(&mut self, msg: SearchMessage) -> bool {
        let search_id = msg.search_id();
        let terminal = !matches!(msg, SearchMessage::Record { .. });
        let changed = self.state.apply_message(msg);
        if terminal && self.live.as_ref().is_some_and(|t| t.id() == search_id) {
            self.live = None;
        }
        changed
    }

    fn run_effects(&mut self, effects: Vec<SearchEffect>) -> SearchResult<()> {
        let mut result = Ok(());
        for effect in effects {
            match effect {
                SearchEffect::CancelSearch { search_id } => {
                    if let Some(task) = self.live.take() {
                        if task.id() == search_id {
                            task.cancel();
                        } else {
                            self.live = Some(task);
                        }
                    }
                }
                SearchEffect::StartSearch(spec) => {
                    if let Some(task) = self.live.take() {
                        task.cancel();
                    }
                    match self
                        .service
                        .search(&spec, self.settings.max_results, self.tx.clone())
                    {
                        Ok(task) => {
                            self.state.search_started(task.id());
                            self.live = Some(task);
                        }
                        Err(e) => {
                            tracing::error!(
                                program = self.service.command().program(),
                                error = %e,
                                "failed to start search"
                            );
                            self.state.search_failed_to_start(&e);
                            result = Err(e);
                        }
                    }
                }
            }
        }
        result
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(task) = self.live.take() {
            task.cancel();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/controller.rs"]
mod tests;
