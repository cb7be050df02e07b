//! 滚动会话
//!
//! 一次分页运行期间的累计状态,运行结束后丢弃

use std::collections::HashSet;
use tokio::time::Instant;

/// 滚动会话
///
/// - seen_ids: 累计见过的帖子ID,只增不减
/// - attempts: 已执行的滚动周期数
/// - no_progress: 连续无新增的周期数
/// - started_at: 会话开始时间
#[derive(Debug)]
pub struct ScrollSession {
    seen_ids: HashSet<String>,
    attempts: u32,
    no_progress: u32,
    started_at: Instant,
}

impl ScrollSession {
    pub fn new() -> Self {
        Self {
            seen_ids: HashSet::new(),
            attempts: 0,
            no_progress: 0,
            started_at: Instant::now(),
        }
    }

    /// 合并本周期可见的ID,返回新增数量
    ///
    /// 虚拟列表会卸载旧内容,因此必须按ID累计,不能只读最终状态
    pub fn merge<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.seen_ids.len();
        self.seen_ids.extend(ids);
        self.seen_ids.len() - before
    }

    /// 结束一个周期: 计数+1,并根据是否有新增更新无进展计数
    pub fn complete_cycle(&mut self, added: usize) {
        self.attempts += 1;
        if added == 0 {
            self.no_progress += 1;
        } else {
            self.no_progress = 0;
        }
    }

    pub fn seen_count(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn seen_ids(&self) -> &HashSet<String> {
        &self.seen_ids
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn no_progress(&self) -> u32 {
        self.no_progress
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl Default for ScrollSession {
    fn default() -> Self {
        Self::new()
    }
}
