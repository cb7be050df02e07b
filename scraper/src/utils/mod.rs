//! 工具模块
//!
//! 纯函数工具,不依赖浏览器运行时:
//! - `number_parser`: 紧凑数字与粉丝数解析
//! - `time_utils`: 相对时间归一化
//! - `phrases`: 多语言短语表
//! - `dom`: HTML快照遍历
//! - `logger`: 日志初始化

pub mod dom;
pub mod logger;
pub mod number_parser;
pub mod phrases;
pub mod time_utils;
