use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 初始化日志系统
///
/// 配置结构化日志输出:
/// - JSON格式: 便于机器解析和日志分析
/// - 按天轮转: 每天一个新文件
/// - non_blocking: 日志I/O不阻塞采集流程
/// - 双输出: 控制台(开发) + 文件(生产)
/// - 环境变量控制: RUST_LOG=debug 可调整日志级别
///
/// # 日志级别
/// - ERROR: 任务失败、输出端不可用
/// - WARN: 限流重试、单条记录解析失败、周期内查询失败
/// - INFO: 任务开始/结束、分页停止原因、批次汇总 (默认级别)
/// - DEBUG: 每个滚动周期的累计数量
///
/// # 示例日志
/// ```json
/// {
///   "timestamp": "2025-10-05T10:30:45.123Z",
///   "level": "INFO",
///   "target": "threads_scraper::services::scroll_engine",
///   "fields": {
///     "任务": "search:rust",
///     "累计数量": 42,
///     "停止原因": "TargetReached"
///   }
/// }
/// ```
///
/// # 重要提示
/// 返回的guard必须被调用者保存,直到程序退出。
/// 如果guard被drop,文件写入器将被关闭。
pub fn init(log_dir: impl AsRef<Path>) -> Result<WorkerGuard, io::Error> {
    let log_dir = resolve_log_dir(log_dir.as_ref());
    std::fs::create_dir_all(&log_dir)?;

    // 文件命名格式: threads-scraper.2025-10-05.log
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("threads-scraper")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 默认: INFO级别,可通过 RUST_LOG 覆盖
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // 文件层: JSON格式
    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false);

    // 控制台层: 人类可读格式 (输出到stderr,stdout留给批次汇总JSON)
    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e.to_string()))?;

    Ok(guard)
}

/// 解析日志目录
///
/// 相对路径原样使用;配置为空时回退到系统数据目录下的 threads-scraper/logs
fn resolve_log_dir(log_dir: &Path) -> PathBuf {
    if log_dir.as_os_str().is_empty() {
        return dirs::data_local_dir()
            .map(|p| p.join("threads-scraper").join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"));
    }
    log_dir.to_path_buf()
}

/// 日志宏辅助模块
///
/// 提供结构化日志的便捷宏
pub mod macros {
    /// 记录业务事件
    ///
    /// 使用示例:
    /// ```no_run
    /// use threads_scraper::log_event;
    /// log_event!("TaskCompleted", task = "search:rust", emitted = 42);
    /// ```
    #[macro_export]
    macro_rules! log_event {
        ($event_type:expr, $($field:tt = $value:expr),* $(,)?) => {
            tracing::info!(
                event_type = $event_type,
                $($field = $value),*
            );
        };
    }

    /// 记录错误事件
    ///
    /// 使用示例:
    /// ```no_run
    /// use threads_scraper::log_error;
    /// log_error!("TaskFailed", task = "@alice", error = "login wall");
    /// ```
    #[macro_export]
    macro_rules! log_error {
        ($event_type:expr, $($field:tt = $value:expr),* $(,)?) => {
            tracing::error!(
                event_type = $event_type,
                $($field = $value),*
            );
        };
    }
}
