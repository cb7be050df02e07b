use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 采集任务级错误
///
/// 对应单个采集任务(关键字/用户名/标签/帖子URL)的失败分类。
/// 只有 `RateLimited` 会被重试策略自动恢复,其余错误对当前任务都是致命的,
/// 由批量调度器记录后继续执行其他任务。
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "error", content = "details")]
pub enum ScrapeError {
    /// 触发平台限流
    ///
    /// 页面文本命中限流短语,可按指数退避重试
    #[error("请求过于频繁,已被限流: {message}")]
    RateLimited { message: String },

    /// 登录墙
    ///
    /// 页面要求登录才能查看内容,重试无意义
    #[error("遇到登录墙: {message}")]
    LoginWall { message: String },

    /// 平台错误页
    ///
    /// 平台返回了通用错误页面 ("Something went wrong" 等)
    #[error("平台错误页: {message}")]
    PlatformError { message: String },

    /// 目标不存在
    ///
    /// 用户或帖子不存在/不可用
    #[error("目标不存在: {message}")]
    NotFound { message: String },

    /// 单条记录解析失败
    ///
    /// 在逐条抽取时捕获,跳过该条记录,不影响同批次其他记录
    #[error("记录解析失败: {0}")]
    Extraction(String),

    /// 浏览器/文档运行时错误
    ///
    /// 导航、脚本执行或与 Playwright Server 通信失败
    #[error("浏览器错误: {0}")]
    Browser(String),

    /// 输出端写入失败
    #[error("记录写入失败: {0}")]
    Storage(String),

    /// 任务执行过程中发生 panic
    ///
    /// 由调度器捕获,仅影响当前任务
    #[error("任务异常终止: {0}")]
    TaskPanicked(String),
}

impl ScrapeError {
    /// 是否为限流错误 (唯一可自动重试的错误)
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ScrapeError::RateLimited { .. })
    }

    /// 错误分类标识,用于日志与汇总报告
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::RateLimited { .. } => "rate_limited",
            ScrapeError::LoginWall { .. } => "login_wall",
            ScrapeError::PlatformError { .. } => "platform_error",
            ScrapeError::NotFound { .. } => "not_found",
            ScrapeError::Extraction(_) => "extraction",
            ScrapeError::Browser(_) => "browser",
            ScrapeError::Storage(_) => "storage",
            ScrapeError::TaskPanicked(_) => "task_panicked",
        }
    }
}

/// 文档运行时错误
///
/// 浏览器后端(Playwright Server / Chromium)的失败场景。
/// 注意: 等待选择器超时不是错误,由 `wait_for_selector` 返回 `Ok(false)`。
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "error", content = "details")]
pub enum DocumentError {
    /// 页面导航失败
    #[error("页面导航失败 ({url}): {message}")]
    Navigation { url: String, message: String },

    /// 页面脚本执行失败
    #[error("页面脚本执行失败: {0}")]
    Evaluation(String),

    /// 与浏览器后端的通信失败
    #[error("浏览器通信失败: {0}")]
    Transport(String),

    /// 后端调用超时
    #[error("浏览器操作超时: {0}")]
    Timeout(String),
}

impl From<DocumentError> for ScrapeError {
    fn from(err: DocumentError) -> Self {
        ScrapeError::Browser(err.to_string())
    }
}

/// 输出端相关错误
///
/// 处理记录写入文件或Redis时的失败场景
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum StorageError {
    /// 文件读写失败
    #[error("文件读写失败: {0}")]
    Io(String),

    /// Redis连接失败
    ///
    /// 无法建立或维持与Redis服务器的连接
    #[error("Redis连接失败: {0}")]
    RedisConnectionFailed(String),

    /// Redis命令执行失败
    #[error("Redis命令执行失败: {0}")]
    CommandFailed(String),

    /// 序列化失败
    ///
    /// 将记录转换为JSON失败
    #[error("数据序列化失败: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// 实现从redis::RedisError到StorageError的转换
impl From<redis::RedisError> for StorageError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() {
            StorageError::RedisConnectionFailed("连接被拒绝".to_string())
        } else {
            StorageError::CommandFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<StorageError> for ScrapeError {
    fn from(err: StorageError) -> Self {
        ScrapeError::Storage(err.to_string())
    }
}

/// 配置相关错误
#[derive(Debug, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "error", content = "details")]
pub enum ConfigError {
    /// 配置值格式错误
    #[error("配置项 {key} 的值无效: {value}")]
    InvalidValue { key: String, value: String },

    /// 配置值超出允许范围
    #[error("配置项 {key} 超出范围: {reason}")]
    OutOfRange { key: String, reason: String },

    /// 配置文件读取失败
    #[error("配置文件读取失败: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err.to_string())
    }
}
