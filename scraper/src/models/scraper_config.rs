//! 采集器配置模型
//!
//! 所有经验常量(超量系数、尝试上限、时间上限)都作为默认值保留在这里,
//! 需要根据真实流量重新校准时只改配置,不动控制流。

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;

/// 重试策略配置
///
/// 默认值: requestDelay 1000ms, maxRetries 3, backoffDelay 5000ms, backoffMultiplier 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicyConfig {
    /// 每次导航前的礼貌延迟 (毫秒)
    pub request_delay_ms: u64,
    /// 首次尝试之后允许的最大重试次数
    pub max_retries: u32,
    /// 首次退避延迟 (毫秒)
    pub backoff_delay_ms: u64,
    /// 退避倍数
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 1000,
            max_retries: 3,
            backoff_delay_ms: 5000,
            backoff_multiplier: 2.0,
        }
    }
}

/// 虚拟滚动分页配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollConfig {
    /// 每个周期的分步滚动次数
    pub sub_steps_per_cycle: u32,
    /// 每步滚动的视口高度比例
    pub sub_step_fraction: f64,
    /// 分步滚动之间的停顿 (毫秒)
    pub sub_step_pause_ms: u64,
    /// 连续无新增周期数达到该值时停止
    pub no_progress_threshold: u32,
    /// 尝试次数硬上限
    pub max_attempts_cap: u32,
    /// 尝试次数基数: 上限为 min(cap, ceil(target/5) + base)
    pub attempts_base: u32,
    /// 单次分页的总时长上限 (秒)
    pub max_duration_secs: u64,
    /// 超量系数: 累计数达到 target × factor 即停止,弥补后续校验丢弃
    pub overshoot_factor: f64,
    /// 等待加载指示器消失的上限 (毫秒)
    pub loading_wait_ms: u64,
    /// 每周期的固定稳定等待 (毫秒)
    pub settle_delay_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            sub_steps_per_cycle: 3,
            sub_step_fraction: 0.8,
            sub_step_pause_ms: 300,
            no_progress_threshold: 4,
            max_attempts_cap: 20,
            attempts_base: 5,
            max_duration_secs: 45,
            overshoot_factor: 1.5,
            loading_wait_ms: 10_000,
            settle_delay_ms: 1_500,
        }
    }
}

impl ScrollConfig {
    /// 根据目标数量推导尝试上限: min(cap, ceil(target/5) + base)
    pub fn max_attempts(&self, target: usize) -> u32 {
        let derived = (target as u32).div_ceil(5) + self.attempts_base;
        derived.min(self.max_attempts_cap)
    }

    /// 超量目标: ceil(target × overshoot)
    pub fn overshoot_target(&self, target: usize) -> usize {
        (target as f64 * self.overshoot_factor).ceil() as usize
    }

    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }
}

/// 导航相关超时
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationConfig {
    /// 页面导航超时 (毫秒)
    pub navigation_timeout_ms: u64,
    /// 等待首个帖子链接出现的超时 (毫秒),超时后才做页面分类
    pub content_wait_timeout_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            content_wait_timeout_ms: 15_000,
        }
    }
}

/// 采集器总配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScraperConfig {
    pub retry: RetryPolicyConfig,
    pub scroll: ScrollConfig,
    pub navigation: NavigationConfig,
    /// 并发任务数
    pub concurrency: usize,
    /// 每个任务默认的最大记录数
    pub max_items: usize,
    /// 平台域名
    pub platform_host: String,
    /// Playwright Server 地址
    pub playwright_server_url: String,
    /// Redis输出端地址 (可选)
    pub redis_url: Option<String>,
    /// JSON Lines输出文件 (可选)
    pub output_path: Option<String>,
    /// 日志目录
    pub log_dir: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicyConfig::default(),
            scroll: ScrollConfig::default(),
            navigation: NavigationConfig::default(),
            concurrency: 2,
            max_items: 50,
            platform_host: "www.threads.net".to_string(),
            playwright_server_url: "ws://localhost:9223".to_string(),
            redis_url: None,
            output_path: None,
            log_dir: "logs".to_string(),
        }
    }
}

impl ScraperConfig {
    /// 校验配置取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::OutOfRange {
                key: "concurrency".into(),
                reason: "并发数必须大于0".into(),
            });
        }
        if self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::OutOfRange {
                key: "backoffMultiplier".into(),
                reason: format!("退避倍数不能小于1: {}", self.retry.backoff_multiplier),
            });
        }
        if self.scroll.overshoot_factor < 1.0 {
            return Err(ConfigError::OutOfRange {
                key: "overshootFactor".into(),
                reason: format!("超量系数不能小于1: {}", self.scroll.overshoot_factor),
            });
        }
        if self.platform_host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "platformHost".into(),
                value: self.platform_host.clone(),
            });
        }
        Ok(())
    }

    /// 用于日志输出的摘要 (不包含Redis密码)
    pub fn summary_for_logging(&self) -> String {
        format!(
            "host={} concurrency={} max_items={} playwright={} redis={} output={}",
            self.platform_host,
            self.concurrency,
            self.max_items,
            self.playwright_server_url,
            if self.redis_url.is_some() { "on" } else { "off" },
            self.output_path.as_deref().unwrap_or("-"),
        )
    }
}
