//! threads-scraper 命令行入口
//!
//! 用法: `threads-scraper <tasks.json>`
//!
//! 任务文件是 `CrawlTask` 的JSON数组。批次汇总以JSON输出到stdout,
//! 日志输出到stderr和日志目录。

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use threads_scraper::models::{CrawlTask, ScraperConfig, StorageError};
use threads_scraper::services::{
    ConfigService, CrawlService, DocumentFactory, JsonLinesSink, RecordSink, RedisSink,
};
use threads_scraper::utils::logger;

/// 未配置输出路径时的默认文件
const DEFAULT_OUTPUT_PATH: &str = "output/threads.jsonl";

#[tokio::main]
async fn main() -> ExitCode {
    let Some(tasks_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("用法: threads-scraper <tasks.json>");
        return ExitCode::from(2);
    };

    let config = match ConfigService::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("配置加载失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // guard 需存活到进程退出
    let _guard = match logger::init(&config.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("日志系统初始化失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tasks = match load_tasks(&tasks_path).await {
        Ok(tasks) => tasks,
        Err(e) => {
            tracing::error!(任务文件 = %tasks_path.display(), 错误 = %e, "读取任务文件失败");
            return ExitCode::FAILURE;
        }
    };

    let sink = match open_sink(&config).await {
        Ok(sink) => sink,
        Err(e) => {
            tracing::error!(错误 = %e, "打开输出端失败");
            return ExitCode::FAILURE;
        }
    };

    let run_id = uuid::Uuid::new_v4();
    tracing::info!(批次ID = %run_id, 任务数 = tasks.len(), 并发数 = config.concurrency, "批次开始");

    let factory = document_factory(&config);
    let service = Arc::new(CrawlService::new(config, sink));
    let result = service.run_all(tasks, factory).await;

    tracing::info!(
        批次ID = %run_id,
        总数 = result.total,
        成功 = result.success,
        失败 = result.fail,
        "批次结束"
    );

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(错误 = %e, "序列化批次结果失败"),
    }
    ExitCode::SUCCESS
}

async fn load_tasks(path: &Path) -> Result<Vec<CrawlTask>, String> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// 配置了 Redis 时写入 Redis,否则写入 JSON Lines 文件
async fn open_sink(config: &ScraperConfig) -> Result<Arc<dyn RecordSink>, StorageError> {
    if let Some(url) = &config.redis_url {
        return Ok(Arc::new(RedisSink::new(url)?));
    }
    let path = config.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH);
    tracing::info!(输出文件 = %path, "使用JSON Lines输出");
    Ok(Arc::new(JsonLinesSink::open(path).await?))
}

#[cfg(not(feature = "chromium"))]
fn document_factory(config: &ScraperConfig) -> Arc<dyn DocumentFactory> {
    Arc::new(threads_scraper::services::PlaywrightSessions::new(
        config.playwright_server_url.clone(),
    ))
}

#[cfg(feature = "chromium")]
fn document_factory(_config: &ScraperConfig) -> Arc<dyn DocumentFactory> {
    Arc::new(threads_scraper::services::ChromiumSessions)
}
