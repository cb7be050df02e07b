use crate::models::{ConfigError, ScraperConfig};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "SCRAPER_";

/// 配置服务
///
/// 配置来源优先级 (高 → 低):
/// 1. 进程环境变量 `SCRAPER_*`
/// 2. .env 文件中的 `SCRAPER_*`
/// 3. `ScraperConfig::default()`
pub struct ConfigService;

impl ConfigService {
    /// 获取 .env 文件路径
    ///
    /// 查找顺序:
    /// 1. 当前工作目录的 .env
    /// 2. 上层目录的 .env (在 scraper/ 内执行的情况)
    fn env_file_path() -> Option<PathBuf> {
        let cwd = env::current_dir().ok()?;

        let env_path = cwd.join(".env");
        if env_path.exists() {
            return Some(env_path);
        }

        cwd.parent()
            .map(|parent| parent.join(".env"))
            .filter(|path| path.exists())
    }

    /// 读取 .env 文件中的变量 (不修改进程环境)
    fn read_env_file() -> Result<HashMap<String, String>, ConfigError> {
        let Some(path) = Self::env_file_path() else {
            tracing::info!("未找到 .env 文件,使用环境变量与默认配置");
            return Ok(HashMap::new());
        };

        let iter = dotenvy::from_path_iter(&path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) =
                item.map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
            vars.insert(key, value);
        }

        tracing::info!(path = %path.display(), 变量数 = vars.len(), "已读取 .env 文件");
        Ok(vars)
    }

    /// 加载并校验配置
    ///
    /// # 错误处理
    /// - .env 不存在时不报错
    /// - 数值格式错误时返回 `ConfigError::InvalidValue` (包含变量名)
    /// - 取值越界时返回 `ConfigError::OutOfRange`
    pub fn load() -> Result<ScraperConfig, ConfigError> {
        let mut vars = Self::read_env_file()?;
        vars.extend(env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)));

        let config = Self::from_vars(&vars)?;
        tracing::info!(配置 = %config.summary_for_logging(), "配置加载完成");
        Ok(config)
    }

    /// 由变量表构造配置
    ///
    /// 读取的变量:
    /// - SCRAPER_CONCURRENCY / SCRAPER_MAX_ITEMS
    /// - SCRAPER_PLATFORM_HOST / SCRAPER_PLAYWRIGHT_URL
    /// - SCRAPER_REDIS_URL / SCRAPER_OUTPUT_PATH / SCRAPER_LOG_DIR (可选)
    /// - SCRAPER_REQUEST_DELAY_MS / SCRAPER_MAX_RETRIES
    /// - SCRAPER_BACKOFF_DELAY_MS / SCRAPER_BACKOFF_MULTIPLIER
    /// - SCRAPER_SCROLL_MAX_DURATION_SECS / SCRAPER_SCROLL_OVERSHOOT
    /// - SCRAPER_SCROLL_NO_PROGRESS / SCRAPER_SCROLL_MAX_ATTEMPTS / SCRAPER_SCROLL_SETTLE_MS
    /// - SCRAPER_NAVIGATION_TIMEOUT_MS / SCRAPER_CONTENT_WAIT_MS
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<ScraperConfig, ConfigError> {
        let mut config = ScraperConfig::default();

        set_parsed(vars, "SCRAPER_CONCURRENCY", &mut config.concurrency)?;
        set_parsed(vars, "SCRAPER_MAX_ITEMS", &mut config.max_items)?;
        set_string(vars, "SCRAPER_PLATFORM_HOST", &mut config.platform_host);
        set_string(vars, "SCRAPER_PLAYWRIGHT_URL", &mut config.playwright_server_url);
        set_string(vars, "SCRAPER_LOG_DIR", &mut config.log_dir);
        if let Some(url) = non_empty(vars, "SCRAPER_REDIS_URL") {
            config.redis_url = Some(url.to_string());
        }
        if let Some(path) = non_empty(vars, "SCRAPER_OUTPUT_PATH") {
            config.output_path = Some(path.to_string());
        }

        let retry = &mut config.retry;
        set_parsed(vars, "SCRAPER_REQUEST_DELAY_MS", &mut retry.request_delay_ms)?;
        set_parsed(vars, "SCRAPER_MAX_RETRIES", &mut retry.max_retries)?;
        set_parsed(vars, "SCRAPER_BACKOFF_DELAY_MS", &mut retry.backoff_delay_ms)?;
        set_parsed(vars, "SCRAPER_BACKOFF_MULTIPLIER", &mut retry.backoff_multiplier)?;

        let scroll = &mut config.scroll;
        set_parsed(vars, "SCRAPER_SCROLL_MAX_DURATION_SECS", &mut scroll.max_duration_secs)?;
        set_parsed(vars, "SCRAPER_SCROLL_OVERSHOOT", &mut scroll.overshoot_factor)?;
        set_parsed(vars, "SCRAPER_SCROLL_NO_PROGRESS", &mut scroll.no_progress_threshold)?;
        set_parsed(vars, "SCRAPER_SCROLL_MAX_ATTEMPTS", &mut scroll.max_attempts_cap)?;
        set_parsed(vars, "SCRAPER_SCROLL_SETTLE_MS", &mut scroll.settle_delay_ms)?;

        let navigation = &mut config.navigation;
        set_parsed(vars, "SCRAPER_NAVIGATION_TIMEOUT_MS", &mut navigation.navigation_timeout_ms)?;
        set_parsed(vars, "SCRAPER_CONTENT_WAIT_MS", &mut navigation.content_wait_timeout_ms)?;

        config.validate()?;
        Ok(config)
    }
}

fn non_empty<'a>(vars: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn set_string(vars: &HashMap<String, String>, key: &str, target: &mut String) {
    if let Some(value) = non_empty(vars, key) {
        *target = value.to_string();
    }
}

fn set_parsed<T: FromStr>(
    vars: &HashMap<String, String>,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(value) = non_empty(vars, key) {
        *target = value.parse::<T>().map_err(|_| {
            tracing::error!(配置项 = %key, 值 = %value, "配置值格式错误");
            ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }
        })?;
    }
    Ok(())
}
