//! rg 输出行解析
//!
//! 格式：`<path>:<line>:<text>`，只有前两个 `:` 有意义，`text` 里可以再出现 `:`。
//! 解析失败的行直接丢弃，不算错误。

use crate::kernel::services::ports::MatchRecord;
use memchr::memchr;
use std::path::Path;

const FIELD_SEP: u8 = b':';

pub fn parse_line(raw: &str, root: &Path) -> Option<MatchRecord> {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let line = strip_root(line, root);

    let bytes = line.as_bytes();
    let first = memchr(FIELD_SEP, bytes)?;
    let second = first + 1 + memchr(FIELD_SEP, &bytes[first + 1..])?;

    let file_path = &line[..first];
    let line_text = &line[second + 1..];
    if file_path.is_empty() || line_text.is_empty() {
        return None;
    }

    let line_number = line[first + 1..second].parse::<usize>().ok()?;

    Some(MatchRecord {
        file_path: file_path.to_string(),
        line_number,
        line_text: line_text.to_string(),
        search_root: root.to_path_buf(),
    })
}

/// 非 UTF-8 内容按 lossy 解码后再解析
pub fn parse_line_bytes(raw: &[u8], root: &Path) -> Option<MatchRecord> {
    parse_line(&String::from_utf8_lossy(raw), root)
}

/// rg 拿到的是绝对路径时输出也带着根目录前缀，去掉它让 `file_path` 保持相对路径。
/// Windows 盘符里的 `:` 也因此不会进入字段切分。
fn strip_root<'a>(line: &'a str, root: &Path) -> &'a str {
    let Some(root) = root.to_str() else {
        return line;
    };
    let root = root.trim_end_matches(is_path_sep);
    if root.is_empty() {
        return line;
    }

    match line.strip_prefix(root) {
        Some(rest) if rest.starts_with(is_path_sep) => &rest[1..],
        _ => line,
    }
}

fn is_path_sep(ch: char) -> bool {
    ch == '/' || ch == '\\'
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/parser.rs"]
mod tests;
