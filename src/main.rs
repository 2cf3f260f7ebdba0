//! rgpick 命令行前端
//!
//! 从 stdin 逐行读命令：
//! - 普通文本：作为查询（`/` 开头为正则）
//! - `:n` / `:p`：移动高亮项并打印预览位置
//! - `:open`：确认当前项，打印跳转位置后退出
//! - `:q`：关闭

use rgpick::app::{Picker, PickerExit, SearchController};
use rgpick::kernel::services::adapters::{
    build_runtime, ensure_settings_file, load_settings, resolve_search_root, roots_from_args,
};
use rgpick::kernel::services::ports::NavigationTarget;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

mod logging;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> ExitCode {
    let logging = logging::init();
    if let Some(guard) = logging.as_ref() {
        tracing::debug!(log_dir = %guard.log_dir().display(), "logging to file");
    }

    match run() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "rgpick failed");
            eprintln!("rgpick: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> io::Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cwd = std::env::current_dir()?;

    let root = match resolve_search_root(&roots_from_args(&cwd, &args)) {
        Ok(root) => root,
        Err(e) => {
            tracing::error!(error = %e, "no search root");
            eprintln!("rgpick: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Err(e) = ensure_settings_file() {
        tracing::warn!(error = %e, "cannot create settings file");
    }
    let settings = load_settings().unwrap_or_default().search;

    let runtime = build_runtime()?;
    let controller = SearchController::new(runtime.handle().clone(), root, settings);
    let mut picker = Picker::open(controller, None);

    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        match line.as_str() {
            ":q" => {
                print_exit(&mut out, picker.hide())?;
                return Ok(ExitCode::SUCCESS);
            }
            ":open" => match picker.accept() {
                Some(target) => {
                    print_target(&mut out, "open", &target)?;
                    print_exit(&mut out, picker.hide())?;
                    return Ok(ExitCode::SUCCESS);
                }
                None => writeln!(out, "nothing selected")?,
            },
            ":n" | ":p" => {
                let delta = if line == ":n" { 1 } else { -1 };
                match picker.move_active(delta) {
                    Some(target) => print_target(&mut out, "preview", &target)?,
                    None => writeln!(out, "no results")?,
                }
            }
            query => {
                if let Err(e) = picker.set_query(query) {
                    writeln!(out, "search failed: {}", e)?;
                    continue;
                }
                if let Err(e) = picker.controller_mut().wait_settled(SETTLE_TIMEOUT) {
                    writeln!(out, "search failed: {}", e)?;
                    continue;
                }
                print_items(&mut out, &picker)?;
            }
        }
        out.flush()?;
    }

    print_exit(&mut out, picker.hide())?;
    Ok(ExitCode::SUCCESS)
}

fn print_items(out: &mut impl Write, picker: &Picker) -> io::Result<()> {
    let controller = picker.controller();
    if let Some(failure) = controller.last_error().filter(|f| f.flagged) {
        return writeln!(out, "search failed: {}", failure.message);
    }

    let items = picker.items();
    for item in &items {
        writeln!(out, "{}\t{}", item.description, item.detail)?;
    }
    if controller.state().is_capped() {
        writeln!(out, "-- {} results (limit reached)", items.len())
    } else {
        writeln!(out, "-- {} results", items.len())
    }
}

fn print_target(out: &mut impl Write, kind: &str, target: &NavigationTarget) -> io::Result<()> {
    writeln!(
        out,
        "{} {}:{}:{}",
        kind,
        target.path.display(),
        target.line + 1,
        target.column + 1
    )
}

fn print_exit(out: &mut impl Write, exit: PickerExit) -> io::Result<()> {
    match exit {
        PickerExit::Restore(origin) => print_target(out, "restore", &origin),
        PickerExit::Accepted | PickerExit::Dismissed => Ok(()),
    }
}
