//! 采集服务
//!
//! 单个任务的顺序流水线:
//! 礼貌延迟 → 导航 → 等待帖子链接 (超时则分类页面) → 滚动分页 →
//! 抽取 → 校验 → 标记来源 → 写入输出端
//!
//! 导航与页面分类整体由重试策略包裹: 只有限流会退避重试,
//! 登录墙、错误页、不存在直接作为任务失败返回给批量调度器。

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{
    BatchResult, BatchTask, CrawlTask, PageStateClassification, PostRecord, PostSource,
    ScrapeError, ScraperConfig, TaskKind,
};
use crate::services::batch_scheduler;
use crate::services::content_extractor::ContentExtractor;
use crate::services::document::{Document, DocumentFactory};
use crate::services::media_capture::MediaCapture;
use crate::services::output_sink::RecordSink;
use crate::services::page_classifier;
use crate::services::profile_extractor;
use crate::services::record_validator::{self, ValidationReason};
use crate::services::retry_policy;
use crate::services::scroll_engine;
use crate::utils::dom;

/// 单个任务的执行报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub task: String,
    /// 写入输出端的帖子数 (不含重复)
    pub emitted: usize,
    /// 校验未通过而丢弃的帖子数
    pub dropped: usize,
    /// 是否写入了用户资料
    pub profile_emitted: bool,
}

impl TaskReport {
    fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Default::default()
        }
    }
}

/// 目标页面就绪状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageReadiness {
    /// 有内容,继续采集
    Ready,
    /// 确实没有结果 (不是失败)
    Empty,
}

/// 帖子的来源标记
struct PostTagging {
    source: PostSource,
    parent_id: Option<String>,
    profile: Option<String>,
}

/// 采集服务
pub struct CrawlService {
    config: ScraperConfig,
    extractor: ContentExtractor,
    sink: Arc<dyn RecordSink>,
}

impl CrawlService {
    pub fn new(config: ScraperConfig, sink: Arc<dyn RecordSink>) -> Self {
        let extractor = ContentExtractor::new(config.platform_host.clone());
        Self {
            config,
            extractor,
            sink,
        }
    }

    /// 替换内容抽取器 (例如使用自定义容器策略)
    pub fn with_extractor(mut self, extractor: ContentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// 在给定文档上执行单个任务
    pub async fn run_task(
        &self,
        document: &dyn Document,
        task: &CrawlTask,
    ) -> Result<TaskReport, ScrapeError> {
        let name = task.name();
        let url = task.target_url(&self.config.platform_host);
        let limit = task.max_items.unwrap_or(self.config.max_items);

        tracing::info!(任务 = %name, 地址 = %url, 目标数量 = limit, "任务开始");

        let readiness =
            retry_policy::with_retry(&self.config.retry, || self.open_target(document, &url, task))
                .await?;

        let mut report = TaskReport::new(name.as_str());
        if readiness == PageReadiness::Empty {
            tracing::info!(任务 = %name, "页面没有结果,任务以零记录结束");
            return Ok(report);
        }

        match &task.kind {
            TaskKind::Search { .. } | TaskKind::Hashtag { .. } => {
                let tagging = PostTagging {
                    source: task.post_source(),
                    parent_id: None,
                    profile: None,
                };
                self.collect_posts(document, &name, limit, None, tagging, &mut report)
                    .await?;
            }
            TaskKind::Profile {
                username,
                include_posts,
            } => {
                let username = username.trim_start_matches('@');
                report.profile_emitted = self.collect_profile(document, username).await?;
                if *include_posts {
                    let tagging = PostTagging {
                        source: PostSource::ProfilePosts,
                        parent_id: None,
                        profile: Some(username.to_string()),
                    };
                    self.collect_posts(document, &name, limit, None, tagging, &mut report)
                        .await?;
                }
            }
            TaskKind::Replies { post_url } => {
                let parent_id = dom::parse_post_href(post_url).map(|(_, id)| id);
                let tagging = PostTagging {
                    source: PostSource::Reply,
                    parent_id: parent_id.clone(),
                    profile: None,
                };
                self.collect_posts(document, &name, limit, parent_id.as_deref(), tagging, &mut report)
                    .await?;
            }
        }

        crate::log_event!(
            "TaskCompleted",
            task = name.as_str(),
            emitted = report.emitted,
            dropped = report.dropped,
            profile = report.profile_emitted,
        );
        Ok(report)
    }

    /// 导航到目标并判断页面状态 (单次尝试)
    async fn open_target(
        &self,
        document: &dyn Document,
        url: &str,
        task: &CrawlTask,
    ) -> Result<PageReadiness, ScrapeError> {
        tokio::time::sleep(retry_policy::polite_delay(&self.config.retry)).await;

        let navigation = &self.config.navigation;
        document
            .goto(url, Duration::from_millis(navigation.navigation_timeout_ms))
            .await?;

        let appeared = document
            .wait_for_selector(
                dom::POST_LINK_CSS,
                Duration::from_millis(navigation.content_wait_timeout_ms),
            )
            .await?;
        if appeared {
            return Ok(PageReadiness::Ready);
        }

        tracing::info!(任务 = %task.name(), "等待帖子超时,开始页面分类");
        let state = page_classifier::classify(document).await?;
        map_classification(&state, task)
    }

    async fn collect_profile(
        &self,
        document: &dyn Document,
        username: &str,
    ) -> Result<bool, ScrapeError> {
        let Some(mut profile) =
            profile_extractor::extract_profile(document, username, &self.config.platform_host)
                .await?
        else {
            return Ok(false);
        };

        let validation = record_validator::apply_profile_validation(&mut profile);
        if !validation.valid {
            tracing::warn!(用户名 = %username, 原因 = ?validation.reason, "资料校验未通过");
            return Ok(false);
        }
        if validation.partial {
            tracing::info!(用户名 = %username, 缺失字段 = ?validation.missing, "资料不完整");
        }

        self.sink.write_profile(&profile).await?;
        Ok(true)
    }

    /// 分页 → 抽取 → 校验 → 标记 → 写入
    ///
    /// 抽取数量取超量目标,写入数量不超过 `limit`
    async fn collect_posts(
        &self,
        document: &dyn Document,
        task_name: &str,
        limit: usize,
        exclude_id: Option<&str>,
        tagging: PostTagging,
        report: &mut TaskReport,
    ) -> Result<(), ScrapeError> {
        let outcome = scroll_engine::paginate(document, limit, &self.config.scroll).await;
        tracing::debug!(任务 = %task_name, 停止原因 = ?outcome.stop_reason, "分页完成");

        let mut media = MediaCapture::new();
        let extract_limit = self.config.scroll.overshoot_target(limit) + usize::from(exclude_id.is_some());
        let posts = self
            .extractor
            .extract_items(document, extract_limit, &mut media)
            .await?;

        for mut post in posts {
            if report.emitted >= limit {
                break;
            }
            if exclude_id == Some(post.id.as_str()) {
                continue;
            }

            let validation = record_validator::validate_post(&post);
            if let Some(reason) = validation.reason {
                report.dropped += 1;
                log_dropped(task_name, &post, reason);
                continue;
            }

            tag_post(&mut post, &tagging);
            if self.sink.write_post(task_name, &post).await? {
                report.emitted += 1;
            }
        }

        tracing::info!(
            任务 = %task_name,
            写入数量 = report.emitted,
            丢弃数量 = report.dropped,
            "帖子写入完成"
        );
        Ok(())
    }

    /// 为每个任务构造批量任务 (每个任务独占一个文档会话)
    pub fn build_batch(
        self: &Arc<Self>,
        tasks: Vec<CrawlTask>,
        factory: Arc<dyn DocumentFactory>,
    ) -> Vec<BatchTask> {
        tasks
            .into_iter()
            .map(|task| {
                let service = Arc::clone(self);
                let factory = Arc::clone(&factory);
                BatchTask::new(task.name(), move || async move {
                    let document = factory.open().await?;
                    let result = service.run_task(document.as_ref(), &task).await;
                    if let Err(e) = document.close().await {
                        tracing::warn!(任务 = %task.name(), 错误 = %e, "关闭文档失败");
                    }
                    result.map(|_| ())
                })
            })
            .collect()
    }

    /// 批量执行全部任务,结束后刷新输出端
    pub async fn run_all(
        self: &Arc<Self>,
        tasks: Vec<CrawlTask>,
        factory: Arc<dyn DocumentFactory>,
    ) -> BatchResult {
        let batch = self.build_batch(tasks, factory);
        let result = batch_scheduler::run_batch(batch, self.config.concurrency).await;

        if let Err(e) = self.sink.flush().await {
            tracing::error!(错误 = %e, "刷新输出端失败");
        }
        result
    }
}

/// 页面分类 → 任务结果
///
/// 优先级与分类消息一致: 限流 > 错误页 (主页/帖子不存在时为 NotFound) > 登录墙 > 空页面。
/// 未登录时错误页的页头同样带登录链接,因此错误页必须先于登录墙判断。
pub fn map_classification(
    state: &PageStateClassification,
    task: &CrawlTask,
) -> Result<PageReadiness, ScrapeError> {
    let message = state.error_message.clone();
    if state.is_rate_limited {
        Err(ScrapeError::RateLimited { message })
    } else if state.is_error_page {
        let targets_entity = matches!(
            task.kind,
            TaskKind::Profile { .. } | TaskKind::Replies { .. }
        );
        if state.is_not_found && targets_entity {
            Err(ScrapeError::NotFound {
                message: format!("{}: {}", task.name(), message),
            })
        } else {
            Err(ScrapeError::PlatformError { message })
        }
    } else if state.is_login_wall {
        Err(ScrapeError::LoginWall { message })
    } else if state.is_empty {
        Ok(PageReadiness::Empty)
    } else {
        Ok(PageReadiness::Ready)
    }
}

fn tag_post(post: &mut PostRecord, tagging: &PostTagging) {
    post.tag_source(tagging.source.clone());
    post.parent_id = tagging.parent_id.clone();
    post.profile = tagging.profile.clone();
}

fn log_dropped(task_name: &str, post: &PostRecord, reason: ValidationReason) {
    tracing::debug!(任务 = %task_name, 帖子ID = %post.id, 原因 = reason.as_str(), "帖子校验未通过,已丢弃");
}
