//! 页面状态分类结果

use serde::{Deserialize, Serialize};

/// 页面状态分类
///
/// 每次检查时重新计算,不持久化
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStateClassification {
    pub is_login_wall: bool,
    pub is_error_page: bool,
    /// 错误页中属于"不存在/不可用"一类的子集
    pub is_not_found: bool,
    pub is_rate_limited: bool,
    pub is_empty: bool,
    pub has_main_content: bool,
    /// 页面中帖子链接的数量
    pub post_link_count: usize,
    /// 诊断信息 (按 限流 > 错误页 > 登录墙 > 空页面 的优先级生成)
    pub error_message: String,
}

impl PageStateClassification {
    /// 页面是否被平台拦截 (限流/错误/登录墙)
    pub fn is_blocked(&self) -> bool {
        self.is_rate_limited || self.is_error_page || self.is_login_wall
    }
}
