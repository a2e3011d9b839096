//! 日志初始化与转发计数。

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// 基础指标快照（MVP）。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub messages_forwarded: u64,
    pub messages_skipped: u64,
    pub publish_failures: u64,
}

/// 基础指标（MVP）。
pub struct RelayMetrics {
    messages_received: AtomicU64,
    messages_forwarded: AtomicU64,
    messages_skipped: AtomicU64,
    publish_failures: AtomicU64,
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            messages_forwarded: AtomicU64::new(0),
            messages_skipped: AtomicU64::new(0),
            publish_failures: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_forwarded: self.messages_forwarded.load(Ordering::Relaxed),
            messages_skipped: self.messages_skipped.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<RelayMetrics> = OnceLock::new();

/// 获取全局指标实例（MVP）。
pub fn metrics() -> &'static RelayMetrics {
    METRICS.get_or_init(RelayMetrics::new)
}

/// 初始化 tracing（默认 info，仅 stdout）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 初始化 tracing，同时输出到 stdout 与本地日志文件（追加写入）。
///
/// 日志文件无法打开时降级为仅 stdout。
pub fn init_tracing_with_file(path: impl AsRef<Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match OpenOptions::new().create(true).append(true).open(path.as_ref()) {
        Ok(file) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init();
        }
        Err(err) => {
            eprintln!(
                "failed to open log file {}: {}, logging to stdout only",
                path.as_ref().display(),
                err
            );
            let _ = fmt().with_env_filter(filter).try_init();
        }
    }
}

/// 记录入站消息接收次数。
pub fn record_message_received() {
    metrics().messages_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录转发成功次数。
pub fn record_message_forwarded() {
    metrics().messages_forwarded.fetch_add(1, Ordering::Relaxed);
}

/// 记录跳过转发次数（空消息、空 JSON、topic 不匹配）。
pub fn record_message_skipped() {
    metrics().messages_skipped.fetch_add(1, Ordering::Relaxed);
}

/// 记录发布失败次数（含未连接时的丢弃）。
pub fn record_publish_failure() {
    metrics().publish_failures.fetch_add(1, Ordering::Relaxed);
}
