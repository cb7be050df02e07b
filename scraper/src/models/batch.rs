//! 批量任务模型

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

use super::errors::ScrapeError;

/// 任务执行体返回的 Future
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), ScrapeError>> + Send + 'static>>;

/// 批量任务
///
/// 一个具名的、无参数的工作单元,执行一次后即被消费
pub struct BatchTask {
    pub name: String,
    work: Box<dyn FnOnce() -> TaskFuture + Send + 'static>,
}

impl BatchTask {
    pub fn new<F, Fut>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), ScrapeError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            work: Box::new(move || Box::pin(work()) as TaskFuture),
        }
    }

    /// 消费任务,得到待执行的 Future
    pub fn into_future(self) -> (String, TaskFuture) {
        (self.name, (self.work)())
    }
}

impl std::fmt::Debug for BatchTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchTask").field("name", &self.name).finish()
    }
}

/// 单个失败任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub task_name: String,
    pub error: ScrapeError,
}

/// 批量执行结果
///
/// 调度完成后满足 success + fail == total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub total: usize,
    pub success: usize,
    pub fail: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.success += 1;
    }

    pub fn record_failure(&mut self, task_name: String, error: ScrapeError) {
        self.fail += 1;
        self.failures.push(BatchFailure { task_name, error });
    }

    /// 所有任务是否都已有结果
    pub fn is_complete(&self) -> bool {
        self.success + self.fail == self.total
    }
}
