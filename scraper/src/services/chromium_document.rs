//! 本地 Chromium 文档后端 (feature = "chromium")
//!
//! 通过 CDP 直接驱动本地浏览器,不依赖 Playwright Server。
//! 网络响应由 `Network.responseReceived` 事件写入本页面独占的缓冲区。

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::models::DocumentError;
use crate::services::document::{Document, DocumentFactory, NetworkResponse};

/// 选择器轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 本地 Chromium 文档
pub struct ChromiumDocument {
    browser: Mutex<Browser>,
    page: Page,
    responses: Arc<Mutex<Vec<NetworkResponse>>>,
    background: Vec<JoinHandle<()>>,
}

impl ChromiumDocument {
    /// 启动无头浏览器并打开空白页
    pub async fn launch() -> Result<Self, DocumentError> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(DocumentError::Transport)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DocumentError::Transport(format!("启动Chromium失败: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DocumentError::Transport(format!("打开页面失败: {}", e)))?;

        let responses = Arc::new(Mutex::new(Vec::new()));
        let mut events = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| DocumentError::Transport(format!("订阅网络事件失败: {}", e)))?;
        let buffer = Arc::clone(&responses);
        let listener_task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let response = NetworkResponse::new(
                    event.response.url.clone(),
                    event.response.mime_type.clone(),
                );
                buffer.lock().await.push(response);
            }
        });

        tracing::info!("Chromium页面已打开");
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            responses,
            background: vec![handler_task, listener_task],
        })
    }

    async fn evaluate<T: DeserializeOwned>(&self, expression: String) -> Result<T, DocumentError> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| DocumentError::Evaluation(e.to_string()))?
            .into_value::<T>()
            .map_err(|e| DocumentError::Evaluation(e.to_string()))
    }

    /// 轮询选择器是否存在,直到与期望一致或超时
    async fn poll_selector(
        &self,
        selector: &str,
        expect_present: bool,
        timeout: Duration,
    ) -> Result<bool, DocumentError> {
        let quoted = serde_json::to_string(selector)
            .map_err(|e| DocumentError::Evaluation(e.to_string()))?;
        let expression = format!("document.querySelector({}) !== null", quoted);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let present: bool = self.evaluate(expression.clone()).await?;
            if present == expect_present {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl Document for ChromiumDocument {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DocumentError> {
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| DocumentError::Timeout(format!("导航超时: {}", url)))?
            .map_err(|e| DocumentError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn content(&self) -> Result<String, DocumentError> {
        self.page
            .content()
            .await
            .map_err(|e| DocumentError::Evaluation(e.to_string()))
    }

    async fn viewport_height(&self) -> Result<f64, DocumentError> {
        self.evaluate("window.innerHeight".to_string()).await
    }

    async fn scroll_by(&self, delta_y: f64) -> Result<(), DocumentError> {
        self.evaluate::<serde_json::Value>(format!("window.scrollBy(0, {}); true", delta_y))
            .await
            .map(|_| ())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, DocumentError> {
        self.poll_selector(selector, true, timeout).await
    }

    async fn wait_for_selector_hidden(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, DocumentError> {
        self.poll_selector(selector, false, timeout).await
    }

    async fn drain_responses(&self) -> Vec<NetworkResponse> {
        std::mem::take(&mut *self.responses.lock().await)
    }

    async fn close(&self) -> Result<(), DocumentError> {
        for task in &self.background {
            task.abort();
        }
        self.browser
            .lock()
            .await
            .close()
            .await
            .map(|_| ())
            .map_err(|e| DocumentError::Transport(format!("关闭Chromium失败: {}", e)))
    }
}

/// 为每个任务启动独立的 Chromium 实例
#[derive(Debug, Clone, Default)]
pub struct ChromiumSessions;

#[async_trait]
impl DocumentFactory for ChromiumSessions {
    async fn open(&self) -> Result<Box<dyn Document>, DocumentError> {
        Ok(Box::new(ChromiumDocument::launch().await?))
    }
}
