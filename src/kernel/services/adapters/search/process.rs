//! rg 进程驱动
//!
//! - `SearchRun`：一次搜索的惰性结果序列，`next()` 逐条产出 `MatchRecord`
//! - `SearchTask`：控制端持有的句柄，只用来取消
//! - `RipgrepService::search`：把 `SearchRun` 放到 runtime 上跑，结果带着 search_id 发回控制线程

use super::command::SearchCommand;
use super::parser::parse_line_bytes;
use super::reader::{LineSource, OutputReader, ReadStrategy};
use crate::kernel::query::SearchSpec;
use crate::kernel::services::ports::search::{
    MatchRecord, Result as SearchResult, SearchEnd, SearchError, SearchMessage,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::sync::Notify;

static SEARCH_ID: AtomicU64 = AtomicU64::new(1);

fn next_search_id() -> u64 {
    SEARCH_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Clone)]
struct CancelSignal {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
    /// 子进程被回收后为 `None`。发信号和清除都在锁内完成，
    /// 回收（wait）只会发生在清除之后，所以信号不会打到被复用的 pid 上。
    pid: Arc<Mutex<Option<u32>>>,
}

impl CancelSignal {
    fn new(pid: Option<u32>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
            pid: Arc::new(Mutex::new(pid)),
        }
    }

    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        {
            let pid = self.pid.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(pid) = *pid {
                terminate_pid(pid);
            }
        }
        self.notify.notify_one();
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// 必须在 wait 回收子进程之前调用
    fn forget_pid(&self) {
        *self.pid.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(unix)]
fn terminate_pid(pid: u32) {
    // SAFETY: kill(2) 只发信号，不涉及内存；调用方持锁保证子进程尚未被回收
    unsafe {
        libc::kill(pid as libc::pid_t, libc::SIGTERM);
    }
}

#[cfg(not(unix))]
fn terminate_pid(_pid: u32) {}

pub struct SearchTask {
    id: u64,
    signal: CancelSignal,
}

impl SearchTask {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 同步发出终止信号；之后这个会话不会再产出任何结果
    pub fn cancel(&self) {
        self.signal.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal.is_cancelled()
    }
}

pub struct SearchRun {
    id: u64,
    child: Child,
    lines: OutputReader<ChildStdout>,
    root: PathBuf,
    cap: usize,
    produced: usize,
    signal: CancelSignal,
    end: Option<SearchEnd>,
    done: bool,
}

impl SearchRun {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn task(&self) -> SearchTask {
        SearchTask {
            id: self.id,
            signal: self.signal.clone(),
        }
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    /// 正常结束（读完或达到上限）时为 `Some`，取消或出错时为 `None`
    pub fn end(&self) -> Option<SearchEnd> {
        self.end
    }

    pub async fn next(&mut self) -> SearchResult<Option<MatchRecord>> {
        loop {
            if self.done {
                return Ok(None);
            }

            if self.signal.is_cancelled() {
                tracing::debug!(search_id = self.id, produced = self.produced, "search cancelled");
                self.terminate().await;
                return Ok(None);
            }

            if self.produced >= self.cap {
                tracing::debug!(search_id = self.id, cap = self.cap, "search reached result cap");
                self.terminate().await;
                self.end = Some(SearchEnd::Capped);
                return Ok(None);
            }

            let line = tokio::select! {
                biased;
                _ = self.signal.notify.notified() => continue,
                line = self.lines.next_line() => line,
            };

            match line {
                Ok(Some(bytes)) => {
                    let Some(record) = parse_line_bytes(&bytes, &self.root) else {
                        continue;
                    };
                    if self.signal.is_cancelled() {
                        continue;
                    }
                    self.produced += 1;
                    return Ok(Some(record));
                }
                Ok(None) => {
                    // 被取消的进程也会让 stdout 提前 EOF
                    if self.signal.is_cancelled() {
                        continue;
                    }
                    self.finish().await;
                    self.end = Some(SearchEnd::Exhausted);
                    return Ok(None);
                }
                Err(_) if self.signal.is_cancelled() => continue,
                Err(e) => {
                    tracing::warn!(search_id = self.id, error = %e, "search output read failed");
                    self.terminate().await;
                    return Err(SearchError::Stream(e));
                }
            }
        }
    }

    async fn terminate(&mut self) {
        self.done = true;
        self.signal.forget_pid();
        let _ = self.child.start_kill();
        let _ = self.child.wait().await;
    }

    async fn finish(&mut self) {
        self.done = true;
        self.signal.forget_pid();
        match self.child.wait().await {
            // rg: 0 有结果，1 没有结果，2 出错（错误信息在 stderr）
            Ok(status) if status.code() == Some(2) => {
                tracing::warn!(search_id = self.id, status = ?status, "search exited with error");
            }
            Ok(status) => {
                tracing::debug!(search_id = self.id, status = ?status, "search exited");
            }
            Err(e) => {
                tracing::warn!(search_id = self.id, error = %e, "search wait failed");
            }
        }
    }
}

impl Drop for SearchRun {
    fn drop(&mut self) {
        // child 随后被 kill_on_drop 回收
        self.signal.forget_pid();
    }
}

pub struct RipgrepService {
    runtime: tokio::runtime::Handle,
    command: SearchCommand,
    strategy: ReadStrategy,
}

impl RipgrepService {
    pub fn new(
        runtime: tokio::runtime::Handle,
        command: SearchCommand,
        strategy: ReadStrategy,
    ) -> Self {
        Self {
            runtime,
            command,
            strategy,
        }
    }

    pub fn command(&self) -> &SearchCommand {
        &self.command
    }

    pub fn strategy(&self) -> ReadStrategy {
        self.strategy
    }

    /// 启动一个 rg 进程，返回惰性结果序列。启动失败返回 `SearchError::Spawn`。
    pub fn run(&self, spec: &SearchSpec, cap: usize) -> SearchResult<SearchRun> {
        let _guard = self.runtime.enter();

        let mut child = self
            .command
            .build(spec)
            .spawn()
            .map_err(SearchError::Spawn)?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SearchError::Spawn(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "search stdout unavailable",
            ))
        })?;

        let id = next_search_id();
        if let Some(stderr) = child.stderr.take() {
            self.runtime.spawn(stderr_loop(id, stderr));
        }

        tracing::debug!(
            search_id = id,
            pattern = %spec.pattern,
            mode = ?spec.mode,
            strategy = ?self.strategy,
            "search started"
        );

        let signal = CancelSignal::new(child.id());
        Ok(SearchRun {
            id,
            child,
            lines: self.strategy.open(stdout, cap),
            root: self.command.root().to_path_buf(),
            cap,
            produced: 0,
            signal,
            end: None,
            done: false,
        })
    }

    /// 在 runtime 上驱动一次搜索；所有消息都带 search_id，控制端据此丢弃过期结果。
    pub fn search(
        &self,
        spec: &SearchSpec,
        cap: usize,
        tx: Sender<SearchMessage>,
    ) -> SearchResult<SearchTask> {
        let mut run = self.run(spec, cap)?;
        let task = run.task();
        let search_id = run.id();

        self.runtime.spawn(async move {
            loop {
                match run.next().await {
                    Ok(Some(record)) => {
                        if tx.send(SearchMessage::Record { search_id, record }).is_err() {
                            run.task().cancel();
                        }
                    }
                    Ok(None) => break,
                    Err(error) => {
                        let _ = tx.send(SearchMessage::Error { search_id, error });
                        return;
                    }
                }
            }

            let msg = match run.end() {
                Some(end) => SearchMessage::Complete {
                    search_id,
                    total: run.produced(),
                    end,
                },
                None => SearchMessage::Cancelled { search_id },
            };
            let _ = tx.send(msg);
        });

        Ok(task)
    }
}

async fn stderr_loop(search_id: u64, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    let mut window_started = Instant::now();
    let mut emitted = 0usize;
    let mut dropped = 0usize;
    let window = Duration::from_secs(1);
    let max_lines = 20usize;

    while let Ok(Some(line)) = lines.next_line().await {
        if window_started.elapsed() >= window {
            if dropped > 0 {
                tracing::warn!(search_id, dropped, "search stderr rate-limited");
            }
            window_started = Instant::now();
            emitted = 0;
            dropped = 0;
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }

        if emitted < max_lines {
            tracing::warn!(search_id, "rg: {}", trimmed);
            emitted += 1;
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::warn!(search_id, dropped, "search stderr rate-limited");
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/process.rs"]
mod tests;
