//! Tokio runtime for search process IO.
//!
//! 控制线程不在 runtime 里，只通过 channel 收消息，所以这里必须是多线程 runtime：
//! current-thread runtime 没有人驱动时，spawn 出去的任务不会执行。

pub fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("rgpick-io")
        .enable_all()
        .build()
        .inspect_err(|e| {
            tracing::error!(error = %e, "Failed to create tokio runtime");
        })
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/runtime.rs"]
mod tests;
