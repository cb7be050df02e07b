//! 数据模型模块
//!
//! 包含所有核心数据结构:
//! - errors: 错误类型定义 (任务级、文档运行时、输出端、配置)
//! - author / post_record / profile_record: 输出记录
//! - page_state: 页面状态分类结果
//! - scroll_session: 单次分页运行的累计状态
//! - batch: 批量任务与汇总结果
//! - crawl_task: 采集任务定义
//! - scraper_config: 全部可调参数

pub mod author;
pub mod batch;
pub mod crawl_task;
pub mod errors;
pub mod page_state;
pub mod post_record;
pub mod profile_record;
pub mod scraper_config;
pub mod scroll_session;

// 重导出常用类型,简化外部引用
pub use author::{Author, UNKNOWN_AUTHOR};
pub use batch::{BatchFailure, BatchResult, BatchTask, TaskFuture};
pub use crawl_task::{CrawlTask, TaskKind};
pub use errors::{ConfigError, DocumentError, ScrapeError, StorageError};
pub use page_state::PageStateClassification;
pub use post_record::{PostRecord, PostSource, PostStats};
pub use profile_record::ProfileRecord;
pub use scraper_config::{NavigationConfig, RetryPolicyConfig, ScraperConfig, ScrollConfig};
pub use scroll_session::ScrollSession;
