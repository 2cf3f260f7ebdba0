//! 搜索根目录解析
//!
//! 多根工作区只取第一个；一个都没有属于配置错误，直接报给用户，不做搜索。

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    NoWorkspaceRoot,
    InvalidRoot { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoWorkspaceRoot => write!(f, "No workspace folder is open"),
            ConfigError::InvalidRoot { path, source } => {
                write!(f, "Invalid workspace folder {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NoWorkspaceRoot => None,
            ConfigError::InvalidRoot { source, .. } => Some(source),
        }
    }
}

/// 返回第一个根目录的绝对路径
pub fn resolve_search_root(roots: &[PathBuf]) -> Result<PathBuf, ConfigError> {
    let first = roots.first().ok_or(ConfigError::NoWorkspaceRoot)?;
    let root = first
        .canonicalize()
        .map_err(|source| ConfigError::InvalidRoot {
            path: first.clone(),
            source,
        })?;

    if !root.is_dir() {
        return Err(ConfigError::InvalidRoot {
            path: first.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        });
    }

    Ok(root)
}

/// 命令行参数 -> 根目录列表；没给参数时用当前目录
pub fn roots_from_args(cwd: &Path, args: &[String]) -> Vec<PathBuf> {
    if args.is_empty() {
        return vec![cwd.to_path_buf()];
    }
    args.iter().map(|arg| cwd.join(arg)).collect()
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/workspace.rs"]
mod tests;
