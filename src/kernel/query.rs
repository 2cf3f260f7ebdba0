//! 查询归一化
//!
//! - 以 `/` 开头：去掉前缀，剩余部分按正则搜索
//! - 其它输入：整体按字面量（fixed string）搜索
//! - 大小写策略统一是 smart case，交给 rg 的 `--smart-case` 处理

pub const REGEX_SENTINEL: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Literal,
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    /// 模式里出现大写字母时区分大小写，否则不区分
    Smart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw_text: String,
    mode: QueryMode,
    case: CaseSensitivity,
}

impl SearchQuery {
    pub fn new(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let mode = if raw_text.starts_with(REGEX_SENTINEL) {
            QueryMode::Regex
        } else {
            QueryMode::Literal
        };
        Self {
            raw_text,
            mode,
            case: CaseSensitivity::Smart,
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    pub fn pattern(&self) -> &str {
        match self.mode {
            QueryMode::Regex => &self.raw_text[REGEX_SENTINEL.len_utf8()..],
            QueryMode::Literal => &self.raw_text,
        }
    }

    pub fn spec(&self) -> SearchSpec {
        SearchSpec {
            pattern: self.pattern().to_string(),
            mode: self.mode,
            case: self.case,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    pub pattern: String,
    pub mode: QueryMode,
    pub case: CaseSensitivity,
}

impl SearchSpec {
    /// 空模式表示“不搜索”：不启动进程，结果直接为空。
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// 模式相关的 rg 选项（不含行号、路径等固定选项）
    pub fn flags(&self) -> Vec<&'static str> {
        let mut flags = Vec::with_capacity(2);
        match self.case {
            CaseSensitivity::Smart => flags.push("--smart-case"),
        }
        if self.mode == QueryMode::Literal {
            flags.push("--fixed-strings");
        }
        flags
    }
}

pub fn normalize(raw_text: &str) -> SearchSpec {
    SearchQuery::new(raw_text).spec()
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/query.rs"]
mod tests;
