//! stdout 读取策略
//!
//! - Streaming：逐行读取，输出一到就交给解析器
//! - Buffered：按块读取，攒够一批完整行再切分，给那些子进程管道不能可靠增量读取的环境兜底
//!
//! 两种策略对外的契约完全一样，cap 和解析规则由调用方统一处理。

use crate::kernel::services::ports::ReadMode;
use memchr::memchr_iter;
use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

const PROBE_TIMEOUT: Duration = Duration::from_millis(500);
const CHUNK_SIZE: usize = 8192;

pub trait LineSource: Send {
    /// 下一行（不含换行符），`None` 表示 EOF
    fn next_line(&mut self) -> impl Future<Output = io::Result<Option<Vec<u8>>>> + Send;
}

pub struct StreamingLines<R> {
    reader: BufReader<R>,
}

impl<R: AsyncRead + Unpin + Send> StreamingLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }
}

impl<R: AsyncRead + Unpin + Send> LineSource for StreamingLines<R> {
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

/// 按块读取，攒够 `batch` 个完整行（或读到 EOF）就停下，队列取空后再继续读。
/// 调用方在达到上限后不再取行，剩下的输出不会被读进内存。
pub struct BufferedLines<R> {
    reader: Option<R>,
    pending: Vec<u8>,
    lines: VecDeque<Vec<u8>>,
    batch: usize,
}

impl<R: AsyncRead + Unpin + Send> BufferedLines<R> {
    pub fn new(reader: R, batch: usize) -> Self {
        Self {
            reader: Some(reader),
            pending: Vec::new(),
            lines: VecDeque::new(),
            batch: batch.max(1),
        }
    }

    async fn fill(&mut self) -> io::Result<()> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(());
        };

        let mut chunk = [0u8; CHUNK_SIZE];
        let mut complete = memchr_iter(b'\n', &self.pending).count();
        let mut eof = false;
        while complete < self.batch {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                eof = true;
                break;
            }
            complete += memchr_iter(b'\n', &chunk[..n]).count();
            self.pending.extend_from_slice(&chunk[..n]);
        }

        let mut start = 0usize;
        for end in memchr_iter(b'\n', &self.pending) {
            self.lines.push_back(self.pending[start..end].to_vec());
            start = end + 1;
        }
        if eof {
            self.reader = None;
            if start < self.pending.len() {
                self.lines.push_back(self.pending[start..].to_vec());
            }
            start = self.pending.len();
        }
        self.pending.drain(..start);
        Ok(())
    }
}

impl<R: AsyncRead + Unpin + Send> LineSource for BufferedLines<R> {
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        if self.lines.is_empty() {
            self.fill().await?;
        }
        Ok(self.lines.pop_front())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStrategy {
    Streaming,
    Buffered,
}

impl ReadStrategy {
    /// `batch`：一次性读取时每批最多攒多少个完整行，通常就是结果上限
    pub fn open<R: AsyncRead + Unpin + Send>(self, reader: R, batch: usize) -> OutputReader<R> {
        match self {
            ReadStrategy::Streaming => OutputReader::Streaming(StreamingLines::new(reader)),
            ReadStrategy::Buffered => OutputReader::Buffered(BufferedLines::new(reader, batch)),
        }
    }

    pub fn from_mode(mode: ReadMode) -> Option<Self> {
        match mode {
            ReadMode::Auto => None,
            ReadMode::Streaming => Some(ReadStrategy::Streaming),
            ReadMode::Buffered => Some(ReadStrategy::Buffered),
        }
    }
}

pub enum OutputReader<R> {
    Streaming(StreamingLines<R>),
    Buffered(BufferedLines<R>),
}

impl<R: AsyncRead + Unpin + Send> LineSource for OutputReader<R> {
    async fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self {
            OutputReader::Streaming(lines) => lines.next_line().await,
            OutputReader::Buffered(lines) => lines.next_line().await,
        }
    }
}

/// 启动时探测一次：用流式读取跑 `<program> --version`，
/// 限定时间内读到第一行就用 Streaming，否则退回 Buffered。
/// 程序本身起不来时按 Streaming 处理，真正搜索时再报启动失败。
pub async fn probe_read_strategy(program: &str) -> ReadStrategy {
    let mut cmd = tokio::process::Command::new(program);
    cmd.arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(program, error = %e, "search program probe failed to start");
            return ReadStrategy::Streaming;
        }
    };

    let Some(stdout) = child.stdout.take() else {
        return ReadStrategy::Buffered;
    };

    let mut lines = StreamingLines::new(stdout);
    let strategy = match tokio::time::timeout(PROBE_TIMEOUT, lines.next_line()).await {
        Ok(Ok(Some(version))) => {
            tracing::info!(
                program,
                version = %String::from_utf8_lossy(&version),
                "search program detected"
            );
            ReadStrategy::Streaming
        }
        Ok(Ok(None)) | Ok(Err(_)) | Err(_) => {
            tracing::warn!(program, "no incremental output from probe, using buffered reads");
            ReadStrategy::Buffered
        }
    };

    let _ = child.start_kill();
    let _ = child.wait().await;
    strategy
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/reader.rs"]
mod tests;
