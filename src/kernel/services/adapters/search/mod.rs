//! 外部行搜索（rg）适配
//!
//! - command: 组装命令行
//! - reader: stdout 读取策略（流式 / 一次性）
//! - parser: 输出行 -> MatchRecord
//! - process: 进程驱动、上限与取消

mod command;
mod parser;
mod process;
mod reader;

pub use command::SearchCommand;
pub use parser::{parse_line, parse_line_bytes};
pub use process::{RipgrepService, SearchRun, SearchTask};
pub use reader::{
    probe_read_strategy, BufferedLines, LineSource, OutputReader, ReadStrategy, StreamingLines,
};
