//! 测试公共模块
//!
//! 提供脚本化的假文档和HTML夹具,所有测试都不访问真实浏览器或网络。
//!
//! `FakeDocument` 模拟虚拟化列表: 每完成一个滚动周期 (默认3次分步滚动)
//! 切换到下一帧HTML,帧用完后停留在最后一帧。

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use threads_scraper::models::DocumentError;
use threads_scraper::services::{Document, DocumentFactory, NetworkResponse};

/// 每帧对应的分步滚动次数 (与默认滚动配置一致)
pub const STEPS_PER_FRAME: usize = 3;

/// 脚本化的假文档
pub struct FakeDocument {
    frames: Vec<String>,
    steps_per_frame: usize,
    content_appears: bool,
    fail_viewport: bool,
    responses: Mutex<Vec<NetworkResponse>>,
    scrolls: AtomicUsize,
    gotos: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl FakeDocument {
    pub fn new(frames: Vec<String>) -> Self {
        Self {
            frames,
            steps_per_frame: STEPS_PER_FRAME,
            content_appears: true,
            fail_viewport: false,
            responses: Mutex::new(Vec::new()),
            scrolls: AtomicUsize::new(0),
            gotos: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 只有一帧的文档
    pub fn single(html: impl Into<String>) -> Self {
        Self::new(vec![html.into()])
    }

    /// 等待帖子链接时超时 (触发页面分类)
    pub fn without_content(mut self) -> Self {
        self.content_appears = false;
        self
    }

    /// 读取视口高度时报错,使每个滚动周期失败
    pub fn with_failing_viewport(mut self) -> Self {
        self.fail_viewport = true;
        self
    }

    /// 预置被动捕获的网络响应
    pub fn with_responses(self, responses: Vec<NetworkResponse>) -> Self {
        *self.responses.lock().unwrap() = responses;
        self
    }

    pub fn with_close_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.closes = counter;
        self
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn goto_count(&self) -> usize {
        self.gotos.load(Ordering::SeqCst)
    }

    fn current_frame(&self) -> String {
        let index = self.scroll_count() / self.steps_per_frame;
        self.frames
            .get(index)
            .or_else(|| self.frames.last())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Document for FakeDocument {
    async fn goto(&self, _url: &str, _timeout: Duration) -> Result<(), DocumentError> {
        self.gotos.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn content(&self) -> Result<String, DocumentError> {
        Ok(self.current_frame())
    }

    async fn viewport_height(&self) -> Result<f64, DocumentError> {
        if self.fail_viewport {
            return Err(DocumentError::Evaluation("viewport unavailable".into()));
        }
        Ok(800.0)
    }

    async fn scroll_by(&self, _delta_y: f64) -> Result<(), DocumentError> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<bool, DocumentError> {
        Ok(self.content_appears)
    }

    async fn wait_for_selector_hidden(
        &self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<bool, DocumentError> {
        Ok(true)
    }

    async fn drain_responses(&self) -> Vec<NetworkResponse> {
        std::mem::take(&mut *self.responses.lock().unwrap())
    }

    async fn close(&self) -> Result<(), DocumentError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 为每次打开复制同一份脚本的工厂
pub struct FakeFactory {
    frames: Vec<String>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl FakeFactory {
    pub fn new(frames: Vec<String>) -> Self {
        Self {
            frames,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl DocumentFactory for FakeFactory {
    async fn open(&self) -> Result<Box<dyn Document>, DocumentError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let document =
            FakeDocument::new(self.frames.clone()).with_close_counter(Arc::clone(&self.closed));
        Ok(Box::new(document))
    }
}

// ============================================================================
// HTML 夹具
// ============================================================================

/// 单条帖子容器
pub fn post_html(username: &str, id: &str, body: &str) -> String {
    format!(
        r#"<div class="post">
            <a href="/@{username}"><span>{username} display</span></a>
            <a href="/@{username}/post/{id}"><time datetime="2025-10-07T10:00:00.000Z">2h</time></a>
            <div><span dir="auto">{body}</span></div>
            <div role="button"><svg aria-label="Like"></svg><span>12</span></div>
            <div role="button"><svg aria-label="Reply"></svg><span>3</span></div>
            <div role="button"><svg aria-label="Repost"></svg><span>1</span></div>
        </div>"#
    )
}

/// 由帖子ID列表构造一帧信息流 (作者统一为 alice)
pub fn feed_html(ids: &[&str]) -> String {
    let posts: String = ids
        .iter()
        .map(|id| post_html("alice", id, &format!("Post body for {} with text", id)))
        .collect();
    page(&posts)
}

/// 包裹为完整页面
pub fn page(inner: &str) -> String {
    format!(
        r#"<html><body><div role="main"><div>{}</div></div></body></html>"#,
        inner
    )
}
