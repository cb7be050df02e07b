//! 服务层模块
//!
//! 包含所有采集业务逻辑:
//! - `document`: 浏览器文档运行时接口
//! - `playwright_document` / `chromium_document`: 两种文档后端
//! - `page_classifier`: 页面状态分类 (限流/登录墙/错误页/空页面)
//! - `scroll_engine`: 虚拟滚动分页
//! - `container_strategy` / `content_extractor` / `profile_extractor`: 内容抽取
//! - `media_capture`: 单任务媒体URL捕获
//! - `record_validator`: 记录校验
//! - `retry_policy`: 限流退避重试
//! - `batch_scheduler`: 并发批量调度
//! - `output_sink`: 记录输出端
//! - `config_service`: 配置加载
//! - `crawl_service`: 单任务流水线与批量入口
//!
//! # 服务架构
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  main: 任务列表 → 批量调度     │
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────────────────────┐
//! │ CrawlService (每个任务一个文档会话)             │
//! │  retry_policy ─► page_classifier              │
//! │  scroll_engine ─► content_extractor           │
//! │                   profile_extractor           │
//! │  record_validator ─► output_sink              │
//! └──────────────┬───────────────────────────────┘
//!                ▼
//!      Document (Playwright / Chromium)
//! ```
//!
//! # 使用示例
//!
//! ```no_run
//! use std::sync::Arc;
//! use threads_scraper::models::{CrawlTask, ScraperConfig, TaskKind};
//! use threads_scraper::services::{CrawlService, MemorySink, PlaywrightSessions};
//!
//! # async fn example() {
//! let config = ScraperConfig::default();
//! let sessions = Arc::new(PlaywrightSessions::new(config.playwright_server_url.clone()));
//! let service = Arc::new(CrawlService::new(config, Arc::new(MemorySink::new())));
//!
//! let tasks = vec![CrawlTask::new(TaskKind::Search { keyword: "rust".into() })];
//! let result = service.run_all(tasks, sessions).await;
//! println!("成功 {} / 失败 {}", result.success, result.fail);
//! # }
//! ```

pub mod batch_scheduler;
#[cfg(feature = "chromium")]
pub mod chromium_document;
pub mod config_service;
pub mod container_strategy;
pub mod content_extractor;
pub mod crawl_service;
pub mod document;
pub mod media_capture;
pub mod output_sink;
pub mod page_classifier;
pub mod playwright_document;
pub mod profile_extractor;
pub mod record_validator;
pub mod retry_policy;
pub mod scroll_engine;

pub use batch_scheduler::run_batch;
#[cfg(feature = "chromium")]
pub use chromium_document::{ChromiumDocument, ChromiumSessions};
pub use config_service::ConfigService;
pub use container_strategy::{ActionControlStrategy, ContainerStrategy};
pub use content_extractor::ContentExtractor;
pub use crawl_service::{CrawlService, PageReadiness, TaskReport};
pub use document::{Document, DocumentFactory, NetworkResponse};
pub use media_capture::MediaCapture;
pub use output_sink::{JsonLinesSink, MemorySink, RecordSink, RedisSink};
pub use playwright_document::{PlaywrightDocument, PlaywrightSessions};
pub use record_validator::{PostValidation, ProfileValidation, ValidationReason};
pub use retry_policy::{with_retry, RetryableError};
pub use scroll_engine::{ScrollOutcome, StopReason};
