//! 文档运行时接口
//!
//! 采集核心依赖的浏览器能力,只在接口层面定义:
//! - 导航到地址并等待基础加载完成
//! - 读取渲染后的HTML快照 (分类与抽取都在快照上进行)
//! - 按相对距离滚动视口
//! - 有超时上限地等待选择器出现/消失 (超时是正常结果,不是错误)
//! - 读取被动捕获的网络响应元数据 (用于补全媒体URL)
//!
//! 实现者:
//! - `PlaywrightDocument`: 通过WebSocket驱动 Playwright Server
//! - `ChromiumDocument`: 通过CDP驱动本地 Chromium (feature = "chromium")

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::DocumentError;

/// 网络响应元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResponse {
    pub url: String,
    #[serde(default)]
    pub content_type: String,
}

impl NetworkResponse {
    pub fn new(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
        }
    }
}

/// 渲染文档句柄
///
/// 每个采集任务独占一个实例,实例之间不共享任何状态
#[async_trait]
pub trait Document: Send + Sync {
    /// 导航到地址,等待 DOMContentLoaded
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DocumentError>;

    /// 当前渲染状态的HTML快照
    async fn content(&self) -> Result<String, DocumentError>;

    /// 视口高度 (像素)
    async fn viewport_height(&self) -> Result<f64, DocumentError>;

    /// 纵向滚动相对距离 (像素)
    async fn scroll_by(&self, delta_y: f64) -> Result<(), DocumentError>;

    /// 等待选择器出现
    ///
    /// 超时返回 `Ok(false)`,不作为错误
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<bool, DocumentError>;

    /// 等待选择器消失 (或从未出现)
    ///
    /// 超时返回 `Ok(false)`,不作为错误
    async fn wait_for_selector_hidden(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, DocumentError>;

    /// 取出自上次调用以来捕获的网络响应
    async fn drain_responses(&self) -> Vec<NetworkResponse>;

    /// 释放文档资源
    async fn close(&self) -> Result<(), DocumentError>;
}

/// 文档会话工厂
///
/// 批量执行时每个任务通过工厂打开自己的文档,任务结束后关闭
#[async_trait]
pub trait DocumentFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Document>, DocumentError>;
}
