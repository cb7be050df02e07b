//! 批量调度器
//!
//! `concurrency` 个工作协程共享一个任务队列,各自循环取出下一个任务执行到结束,
//! 直到队列为空。单个任务的失败 (包括 panic) 只记录到结果中,不影响其他任务。
//!
//! 保证:
//! - 每个任务恰好执行一次 (出队在锁内完成)
//! - 同一任务不会被两个工作协程同时执行
//! - 不保证任务的完成顺序

use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinError;

use crate::models::{BatchResult, BatchTask, ScrapeError};

/// 并发执行一批任务,全部结束后返回汇总
pub async fn run_batch(tasks: Vec<BatchTask>, concurrency: usize) -> BatchResult {
    let total = tasks.len();
    let queue = Arc::new(Mutex::new(tasks.into_iter().collect::<VecDeque<_>>()));
    let result = Arc::new(Mutex::new(BatchResult::new(total)));
    let worker_count = concurrency.max(1).min(total.max(1));

    tracing::info!(任务总数 = total, 并发数 = worker_count, "批量任务开始");

    let workers: Vec<_> = (0..worker_count)
        .map(|worker_id| {
            let queue = Arc::clone(&queue);
            let result = Arc::clone(&result);
            tokio::spawn(worker_loop(worker_id, queue, result))
        })
        .collect();

    for joined in join_all(workers).await {
        if let Err(e) = joined {
            tracing::error!(错误 = %e, "工作协程异常退出");
        }
    }

    let summary = result.lock().await.clone();
    tracing::info!(
        任务总数 = summary.total,
        成功 = summary.success,
        失败 = summary.fail,
        "批量任务结束"
    );
    summary
}

/// 工作协程: 反复取出下一个任务直到队列为空
async fn worker_loop(
    worker_id: usize,
    queue: Arc<Mutex<VecDeque<BatchTask>>>,
    result: Arc<Mutex<BatchResult>>,
) {
    loop {
        let next = queue.lock().await.pop_front();
        let Some(task) = next else {
            break;
        };

        let name = task.name.clone();
        tracing::info!(工作协程 = worker_id, 任务 = %name, "任务开始");

        // 单独 spawn,使任务内的 panic 被隔离为 JoinError
        let outcome = match tokio::spawn(async move {
            let (_, future) = task.into_future();
            future.await
        })
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => Err(ScrapeError::TaskPanicked(panic_message(e))),
        };

        let mut summary = result.lock().await;
        match outcome {
            Ok(()) => {
                tracing::info!(工作协程 = worker_id, 任务 = %name, "任务成功");
                summary.record_success();
            }
            Err(e) => {
                crate::log_error!(
                    "TaskFailed",
                    task = name.as_str(),
                    kind = e.kind(),
                    error = e.to_string().as_str(),
                );
                summary.record_failure(name, e);
            }
        }
    }

    tracing::debug!(工作协程 = worker_id, "队列已空,工作协程退出");
}

fn panic_message(err: JoinError) -> String {
    if err.is_cancelled() {
        return "任务被取消".to_string();
    }
    let payload = err.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知 panic".to_string()
    }
}
