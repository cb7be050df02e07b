//! Threads 采集器
//!
//! 在无限滚动的社交平台页面上采集帖子与用户资料:
//! - 虚拟滚动分页 (按ID累计,容忍DOM回收)
//! - 页面状态识别 (限流/登录墙/错误页/空页面)
//! - 帖子与资料抽取、校验、来源标记
//! - 限流退避重试与有上限的并发批量调度
//!
//! 浏览器能力通过 [`services::Document`] 接口注入,
//! 采集逻辑本身只在HTML快照上工作。

pub mod models;
pub mod services;
pub mod utils;
