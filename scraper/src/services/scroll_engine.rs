//! 虚拟滚动分页引擎
//!
//! 平台的帖子列表是虚拟化的: 滚出视口的帖子会被移出DOM。
//! 因此每个周期都按ID把当前可见帖子并入累计集合,而不是只读最终状态。
//!
//! 周期状态: 滚动 → 等待加载 → 收集ID → (继续 | 停止)
//!
//! 停止条件 (先到先停):
//! - 累计数量达到 target × 超量系数
//! - 连续无新增周期达到阈值
//! - 周期数达到由 target 推导的上限
//! - 总耗时超过上限
//!
//! 引擎不做内容抽取,最终抽取由内容抽取器在滚动结束后一次完成。

use scraper::Html;
use serde::Serialize;
use std::time::Duration;

use crate::models::{DocumentError, ScrollConfig, ScrollSession};
use crate::services::document::Document;
use crate::utils::dom;

/// 加载指示器
pub const LOADING_INDICATOR: &str = r#"[role="progressbar"], [aria-busy="true"]"#;

/// 停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// 累计数量达到超量目标
    TargetReached,
    /// 连续多个周期没有新增
    NoProgress,
    /// 周期数达到上限
    AttemptCap,
    /// 总耗时超过上限
    TimeCeiling,
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollOutcome {
    /// 累计见过的帖子数
    pub seen: usize,
    /// 执行的滚动周期数
    pub cycles: u32,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// 驱动滚动直到满足停止条件
///
/// 周期内的任何文档错误都按"本周期无新增"处理,不会中断整个会话
pub async fn paginate(document: &dyn Document, target: usize, config: &ScrollConfig) -> ScrollOutcome {
    let mut session = ScrollSession::new();
    let overshoot_target = config.overshoot_target(target);
    let max_attempts = config.max_attempts(target);

    match visible_ids(document).await {
        Ok(ids) => {
            session.merge(ids);
        }
        Err(e) => tracing::warn!(错误 = %e, "读取初始帖子失败,按空集合继续"),
    }

    tracing::debug!(
        目标数量 = target,
        超量目标 = overshoot_target,
        最大周期数 = max_attempts,
        初始数量 = session.seen_count(),
        "开始滚动分页"
    );

    let stop_reason = loop {
        if let Some(reason) = stop_condition(&session, overshoot_target, max_attempts, config) {
            break reason;
        }

        let ids = match run_cycle(document, config).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(周期 = session.attempts() + 1, 错误 = %e, "滚动周期失败,按无新增处理");
                Vec::new()
            }
        };
        let added = session.merge(ids);
        session.complete_cycle(added);

        tracing::debug!(
            周期 = session.attempts(),
            新增数量 = added,
            累计数量 = session.seen_count(),
            连续无新增 = session.no_progress(),
            "滚动周期完成"
        );
    };

    let outcome = ScrollOutcome {
        seen: session.seen_count(),
        cycles: session.attempts(),
        stop_reason,
        elapsed: session.elapsed(),
    };

    tracing::info!(
        累计数量 = outcome.seen,
        周期数 = outcome.cycles,
        停止原因 = ?outcome.stop_reason,
        耗时毫秒 = outcome.elapsed.as_millis() as u64,
        "滚动分页结束"
    );
    outcome
}

/// 按优先级检查停止条件
fn stop_condition(
    session: &ScrollSession,
    overshoot_target: usize,
    max_attempts: u32,
    config: &ScrollConfig,
) -> Option<StopReason> {
    if session.seen_count() >= overshoot_target {
        Some(StopReason::TargetReached)
    } else if session.no_progress() >= config.no_progress_threshold {
        Some(StopReason::NoProgress)
    } else if session.attempts() >= max_attempts {
        Some(StopReason::AttemptCap)
    } else if session.elapsed() >= config.max_duration() {
        Some(StopReason::TimeCeiling)
    } else {
        None
    }
}

/// 单个滚动周期: 分步滚动 → 等待加载指示器消失 → 稳定等待 → 读取可见ID
async fn run_cycle(document: &dyn Document, config: &ScrollConfig) -> Result<Vec<String>, DocumentError> {
    let viewport = document.viewport_height().await?;
    let step = viewport * config.sub_step_fraction;

    for index in 0..config.sub_steps_per_cycle {
        document.scroll_by(step).await?;
        if index + 1 < config.sub_steps_per_cycle {
            tokio::time::sleep(Duration::from_millis(config.sub_step_pause_ms)).await;
        }
    }

    let cleared = document
        .wait_for_selector_hidden(LOADING_INDICATOR, Duration::from_millis(config.loading_wait_ms))
        .await?;
    if !cleared {
        tracing::debug!("加载指示器未在时限内消失,继续");
    }

    tokio::time::sleep(Duration::from_millis(config.settle_delay_ms)).await;
    visible_ids(document).await
}

/// 当前渲染的帖子ID
async fn visible_ids(document: &dyn Document) -> Result<Vec<String>, DocumentError> {
    let html = document.content().await?;
    Ok(collect_ids(&html))
}

fn collect_ids(html: &str) -> Vec<String> {
    dom::collect_post_ids(&Html::parse_document(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_condition_priority() {
        let config = ScrollConfig::default();
        let mut session = ScrollSession::new();
        session.merge((0..15).map(|i| i.to_string()));
        for _ in 0..4 {
            session.complete_cycle(0);
        }

        // 同时满足时目标优先
        assert_eq!(
            stop_condition(&session, 15, 20, &config),
            Some(StopReason::TargetReached)
        );
        assert_eq!(
            stop_condition(&session, 100, 20, &config),
            Some(StopReason::NoProgress)
        );
    }

    #[test]
    fn test_attempt_cap() {
        let config = ScrollConfig::default();
        let mut session = ScrollSession::new();
        for i in 0..7 {
            let added = session.merge(vec![i.to_string()]);
            session.complete_cycle(added);
        }
        assert_eq!(stop_condition(&session, 100, 7, &config), Some(StopReason::AttemptCap));
        assert_eq!(stop_condition(&session, 100, 8, &config), None);
    }
}
