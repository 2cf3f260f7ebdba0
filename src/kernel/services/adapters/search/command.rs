//! 组装 rg 命令行
//!
//! 顺序固定：输出格式选项 -> 模式相关选项 -> `--` -> pattern -> root。
//! `--` 之后的参数不会再被当成选项，所以 `-foo` 这样的 pattern 也是安全的。

use crate::kernel::query::SearchSpec;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

const OUTPUT_FLAGS: &[&str] = &[
    "--no-config",
    "--line-number",
    "--with-filename",
    "--no-heading",
    "--color",
    "never",
];

#[derive(Debug, Clone)]
pub struct SearchCommand {
    program: String,
    root: PathBuf,
    include_hidden: bool,
}

impl SearchCommand {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>, include_hidden: bool) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
            include_hidden,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn args(&self, spec: &SearchSpec) -> Vec<OsString> {
        let mut args: Vec<OsString> = OUTPUT_FLAGS.iter().map(OsString::from).collect();
        args.extend(spec.flags().into_iter().map(OsString::from));
        if self.include_hidden {
            args.push("--hidden".into());
        }
        args.push("--".into());
        args.push(spec.pattern.clone().into());
        args.push(self.root.clone().into_os_string());
        args
    }

    /// stdin 关闭，stdout/stderr 走管道；drop 时强制结束子进程。
    pub fn build(&self, spec: &SearchSpec) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(self.args(spec))
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/command.rs"]
mod tests;
