use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, SearchError>;

/// 搜索进程级别的失败。单行解析失败不是错误，直接跳过。
#[derive(Debug)]
pub enum SearchError {
    /// 搜索程序无法启动（找不到可执行文件、没有权限……）
    Spawn(io::Error),
    /// 读取 stdout 过程中出错，只影响当前会话
    Stream(io::Error),
}

impl SearchError {
    /// 需要明确提示给用户的失败；其余情况退化为“没有结果”。
    pub fn is_failure(&self) -> bool {
        matches!(self, SearchError::Spawn(_))
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Spawn(e) => write!(f, "Failed to start search: {}", e),
            SearchError::Stream(e) => write!(f, "Search output error: {}", e),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Spawn(e) | SearchError::Stream(e) => Some(e),
        }
    }
}

/// 留在状态里给界面展示的错误摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub message: String,
    /// 为 true 时界面应明确提示失败，而不是只显示空列表
    pub flagged: bool,
}

impl From<&SearchError> for SearchFailure {
    fn from(e: &SearchError) -> Self {
        Self {
            message: e.to_string(),
            flagged: e.is_failure(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub file_path: String,
    pub line_number: usize,
    pub line_text: String,
    pub search_root: PathBuf,
}

impl MatchRecord {
    pub fn view(&self) -> PickerItem {
        PickerItem {
            label: String::new(),
            description: format!("{}:{}", self.file_path, self.line_number),
            detail: self.line_text.clone(),
        }
    }

    /// 搜索程序输出的行号从 1 开始，编辑器内部位置从 0 开始。
    pub fn navigation_target(&self, preserve_focus: bool) -> NavigationTarget {
        NavigationTarget {
            path: self.search_root.join(&self.file_path),
            line: self.line_number.saturating_sub(1),
            column: 0,
            preserve_focus,
        }
    }
}

/// 交给展示层的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    pub label: String,
    pub description: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub preserve_focus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEnd {
    Exhausted,
    Capped,
}

#[derive(Debug)]
pub enum SearchMessage {
    Record {
        search_id: u64,
        record: MatchRecord,
    },
    Complete {
        search_id: u64,
        total: usize,
        end: SearchEnd,
    },
    Cancelled {
        search_id: u64,
    },
    Error {
        search_id: u64,
        error: SearchError,
    },
}

impl SearchMessage {
    pub fn search_id(&self) -> u64 {
        match self {
            SearchMessage::Record { search_id, .. }
            | SearchMessage::Complete { search_id, .. }
            | SearchMessage::Cancelled { search_id }
            | SearchMessage::Error { search_id, .. } => *search_id,
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/ports/search.rs"]
mod tests;
